//! Cart estimation and order placement.

use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use evergreen_core::{OrderStatus, UserId};

use crate::db::{RepositoryError, orders};
use crate::models::catalog::ProductWithCategory;
use crate::services::sellable::{self, SellableError};
use thiserror::Error;

/// One requested cart line. Quantity bounds are enforced at the route
/// boundary (1..=99).
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Result of a cart estimate.
#[derive(Debug, Clone)]
pub struct CartTotals {
    /// Sum of quantities over all lines.
    pub total_items: i64,
    /// Sum of price x quantity over all lines.
    pub total_sum: f64,
    /// Per-id line amount; repeated ids overwrite (last write wins).
    pub breakdown: HashMap<String, f64>,
}

/// Errors from cart estimation or order placement.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An id resolved to neither a product nor a service.
    #[error("product or service {0} not found")]
    UnknownItem(String),

    /// Resolution failure (database, or no category to materialize into).
    #[error(transparent)]
    Sellable(#[from] SellableError),

    /// Database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Price a cart without persisting anything.
///
/// Every line is resolved in quote mode; a single unresolved id fails the
/// whole estimate.
///
/// # Errors
///
/// Returns `OrderError::UnknownItem` naming the first unresolvable id, or a
/// wrapped database error.
pub async fn estimate_cart(pool: &SqlitePool, lines: &[CartLine]) -> Result<CartTotals, OrderError> {
    let mut conn = pool.acquire().await.map_err(RepositoryError::Database)?;

    let mut breakdown: HashMap<String, f64> = HashMap::new();
    let mut total_sum = 0.0;
    let mut total_items = 0;

    for line in lines {
        let sellable = sellable::resolve_quote(&mut conn, &line.product_id)
            .await?
            .ok_or_else(|| OrderError::UnknownItem(line.product_id.clone()))?;

        #[allow(clippy::cast_precision_loss)] // quantities are bounded 1..=99
        let amount = sellable.price() * line.quantity as f64;
        breakdown.insert(line.product_id.clone(), amount);
        total_sum += amount;
        total_items += line.quantity;
    }

    Ok(CartTotals {
        total_items,
        total_sum,
        breakdown,
    })
}

/// Place an order for a user.
///
/// Each distinct id is resolved once in commit mode (materializing services
/// as needed); duplicated input lines become duplicated order items. The
/// order row, its items, the accumulated total and any materialized product
/// rows commit in one transaction - a failure anywhere leaves nothing
/// behind.
///
/// Returns the new order id.
///
/// # Errors
///
/// Returns `OrderError::UnknownItem` naming the first unresolvable id,
/// `OrderError::Sellable` when materialization has no category fallback, or
/// a wrapped database error.
pub async fn place_order(
    pool: &SqlitePool,
    user_id: UserId,
    lines: &[CartLine],
) -> Result<String, OrderError> {
    let mut tx = pool.begin().await.map_err(RepositoryError::Database)?;

    let mut resolved: HashMap<String, ProductWithCategory> = HashMap::new();
    for line in lines {
        if resolved.contains_key(&line.product_id) {
            continue;
        }
        let product = sellable::resolve_for_order(&mut *tx, &line.product_id)
            .await?
            .ok_or_else(|| OrderError::UnknownItem(line.product_id.clone()))?;
        resolved.insert(line.product_id.clone(), product);
    }

    let order_id = generate_order_id();
    orders::insert_order(&mut *tx, &order_id, user_id, OrderStatus::New).await?;

    let mut total_sum = 0.0;
    for line in lines {
        // Every line id is present: resolved above or skipped as duplicate.
        let Some(product) = resolved.get(&line.product_id) else {
            return Err(OrderError::UnknownItem(line.product_id.clone()));
        };
        let price = product.product.price;
        #[allow(clippy::cast_precision_loss)] // quantities are bounded 1..=99
        let line_total = price * line.quantity as f64;
        total_sum += line_total;
        orders::insert_order_item(&mut *tx, &order_id, &product.product.id, line.quantity, price)
            .await?;
    }

    orders::set_order_total(&mut *tx, &order_id, total_sum).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok(order_id)
}

/// Random order id: `ORD-` plus 8 uppercase hex chars. Collisions are not
/// retried; a clash surfaces as a database error.
fn generate_order_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", hex[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ids_have_the_expected_shape() {
        let id = generate_order_id();
        assert!(id.starts_with("ORD-"));
        assert_eq!(id.len(), 12);
        assert!(id[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
