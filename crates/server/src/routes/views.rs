//! Response bodies shared across route modules.
//!
//! Field names follow the public API contract: camelCase-free snake_case
//! JSON, timestamps as epoch seconds, password hashes never serialized.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::catalog::{Category, ProductWithCategory, ServiceWithCategory};
use crate::models::user::User;

/// Epoch seconds, the timestamp shape clients expect.
#[allow(clippy::cast_precision_loss)]
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

/// A category as listed by the storefront.
#[derive(Debug, Serialize)]
pub struct CategoryOut {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

impl From<Category> for CategoryOut {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.as_i64(),
            slug: category.slug,
            title: category.title,
            description: category.description,
            image: category.hero_image,
        }
    }
}

/// A product with its category slug list.
#[derive(Debug, Serialize)]
pub struct ProductOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub categories: Vec<String>,
    pub image_urls: Vec<String>,
    pub characteristics: HashMap<String, String>,
    pub created_at: f64,
}

impl From<ProductWithCategory> for ProductOut {
    fn from(row: ProductWithCategory) -> Self {
        Self {
            id: row.product.id,
            title: row.product.title,
            description: row.product.description,
            price: row.product.price,
            categories: vec![row.category_slug],
            image_urls: row.product.image_urls.0,
            characteristics: row.product.characteristics.0,
            created_at: epoch_seconds(row.product.created),
        }
    }
}

/// A bookable service; `category_id` carries the category slug or null.
#[derive(Debug, Serialize)]
pub struct ServiceOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: String,
    pub image_url: String,
    pub category_id: Option<String>,
    pub created_at: f64,
}

impl From<ServiceWithCategory> for ServiceOut {
    fn from(row: ServiceWithCategory) -> Self {
        Self {
            id: row.service.id,
            title: row.service.title,
            description: row.service.description,
            price: row.service.price,
            status: row.service.status,
            image_url: row.service.image_url,
            category_id: row.category_slug,
            created_at: epoch_seconds(row.service.created),
        }
    }
}

/// An account without its credential material.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub created_at: f64,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i64(),
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            address: user.address,
            created_at: epoch_seconds(user.created),
        }
    }
}

/// One order line with its product embedded.
#[derive(Debug, Serialize)]
pub struct OrderItemOut {
    pub product: ProductOut,
    pub quantity: i64,
    pub price: f64,
}

/// A full order view: status, totals, customer and items.
#[derive(Debug, Serialize)]
pub struct OrderOut {
    pub id: String,
    pub status: String,
    pub total_sum: f64,
    pub created_at: f64,
    pub customer: UserOut,
    pub items: Vec<OrderItemOut>,
}
