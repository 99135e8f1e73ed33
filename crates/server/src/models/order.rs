//! Order row models.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use evergreen_core::{OrderItemId, UserId};

/// A placed order. Created only through order placement; never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: String,
    pub user_id: UserId,
    pub status: String,
    pub total_sum: f64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub is_deleted: bool,
}

/// One line of an order.
///
/// `price` is the unit price captured at purchase time; later product price
/// changes do not touch it. `product_id` always points at a products row,
/// even when the purchased entity started out as a service.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price: f64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub is_deleted: bool,
}
