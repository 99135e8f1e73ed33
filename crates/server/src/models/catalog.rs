//! Catalog row models: categories, products and services.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

use evergreen_core::CategoryId;

/// A catalog category. Owns products; optionally referenced by services.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub hero_image: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub is_deleted: bool,
}

/// A physical product, or a service materialized into the product table.
///
/// Materialized rows are recognizable by the `{"type": "service"}` marker in
/// `characteristics`.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: String,
    pub category_id: CategoryId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_urls: Json<Vec<String>>,
    pub characteristics: Json<HashMap<String, String>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub is_deleted: bool,
}

/// A product row joined with its category slug, the shape most read paths
/// want.
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithCategory {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_slug: String,
}

/// A service row joined with its optional category slug.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceWithCategory {
    #[sqlx(flatten)]
    pub service: Service,
    pub category_slug: Option<String>,
}

/// A bookable offering. Shares the purchase pipeline with products but is
/// never referenced by order items directly.
#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: String,
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: String,
    pub image_url: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub is_deleted: bool,
}
