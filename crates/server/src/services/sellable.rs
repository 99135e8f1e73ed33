//! Cross-entity resolution between products and services.
//!
//! Purchasable ids live in two disjoint tables sharing one namespace in
//! client requests. A [`Sellable`] is the resolved view: either a physical
//! product or a bookable service.
//!
//! Resolution has two modes:
//!
//! - **Quote** ([`resolve_quote`]): read-only; a service stays a service.
//!   Used by cart estimation, which must never write.
//! - **Commit** ([`resolve_for_order`]): order items carry a foreign key
//!   into the product table, so a service hit materializes a product row
//!   with the same id before the order is persisted. Idempotent: once the
//!   row exists, later resolutions find the product directly.
//!
//! Both take an explicit connection so commit-mode runs inside the order
//! placement transaction.

use std::collections::HashMap;

use sqlx::SqliteConnection;
use thiserror::Error;

use crate::db::catalog::{self, NewProduct};
use crate::db::RepositoryError;
use crate::models::catalog::{ProductWithCategory, ServiceWithCategory};

/// Marker stored in materialized products' characteristics.
const SERVICE_MARKER: (&str, &str) = ("type", "service");

/// Errors from resolution.
#[derive(Debug, Error)]
pub enum SellableError {
    /// Database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A service without a category cannot materialize when the category
    /// table is empty.
    #[error("no categories found")]
    NoCategories,
}

/// A purchasable entity: a physical product or a bookable service, unified
/// behind one accessor set.
#[derive(Debug, Clone)]
pub enum Sellable {
    Physical(ProductWithCategory),
    Bookable(ServiceWithCategory),
}

impl Sellable {
    /// Client-facing id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Physical(p) => &p.product.id,
            Self::Bookable(s) => &s.service.id,
        }
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> f64 {
        match self {
            Self::Physical(p) => p.product.price,
            Self::Bookable(s) => s.service.price,
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Physical(p) => &p.product.title,
            Self::Bookable(s) => &s.service.title,
        }
    }

    /// Description text.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Physical(p) => &p.product.description,
            Self::Bookable(s) => &s.service.description,
        }
    }

    /// Image URLs; a bookable exposes its single image as a one-element list.
    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        match self {
            Self::Physical(p) => p.product.image_urls.0.clone(),
            Self::Bookable(s) => {
                if s.service.image_url.is_empty() {
                    Vec::new()
                } else {
                    vec![s.service.image_url.clone()]
                }
            }
        }
    }

    /// Characteristics map; a bookable reports the service marker.
    #[must_use]
    pub fn characteristics(&self) -> HashMap<String, String> {
        match self {
            Self::Physical(p) => p.product.characteristics.0.clone(),
            Self::Bookable(_) => service_characteristics(),
        }
    }

    /// Category slugs for presentation, possibly empty for a bookable.
    #[must_use]
    pub fn category_slugs(&self) -> Vec<String> {
        match self {
            Self::Physical(p) => vec![p.category_slug.clone()],
            Self::Bookable(s) => s.category_slug.clone().into_iter().collect(),
        }
    }
}

fn service_characteristics() -> HashMap<String, String> {
    HashMap::from([(SERVICE_MARKER.0.to_owned(), SERVICE_MARKER.1.to_owned())])
}

/// Resolve an id for a price quote. Products win; services come back as
/// bookables; unknown ids resolve to `None`. Never writes.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a lookup fails.
pub async fn resolve_quote(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Sellable>, RepositoryError> {
    if let Some(product) = catalog::get_product(conn, id).await? {
        return Ok(Some(Sellable::Physical(product)));
    }

    Ok(catalog::get_service(conn, id)
        .await?
        .map(Sellable::Bookable))
}

/// Resolve an id for order placement, materializing a service into a
/// product row when needed.
///
/// The materialized row reuses the service id, price, title and description,
/// carries the `{"type": "service"}` marker, and takes the service's
/// category - or the lowest-id category as fallback.
///
/// # Errors
///
/// Returns `SellableError::NoCategories` when a category-less service has no
/// fallback, or a wrapped repository error.
pub async fn resolve_for_order(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<ProductWithCategory>, SellableError> {
    if let Some(product) = catalog::get_product(conn, id).await? {
        return Ok(Some(product));
    }

    let Some(with_category) = catalog::get_service(conn, id).await? else {
        return Ok(None);
    };
    let service = with_category.service;

    let category_id = match service.category_id {
        Some(category_id) => category_id,
        None => catalog::first_category_id(conn)
            .await?
            .ok_or(SellableError::NoCategories)?,
    };

    let image_urls = if service.image_url.is_empty() {
        Vec::new()
    } else {
        vec![service.image_url]
    };

    let product = catalog::insert_product(
        conn,
        NewProduct {
            id: service.id,
            category_id,
            title: service.title,
            description: service.description,
            price: service.price,
            image_urls,
            characteristics: service_characteristics(),
        },
    )
    .await?;

    Ok(Some(product))
}
