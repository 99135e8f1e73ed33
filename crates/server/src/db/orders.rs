//! Order repository.
//!
//! Reads and the admin status update live on [`OrderRepository`]; the
//! insert path is a set of connection-level helpers so order placement can
//! drive them inside one transaction together with service materialization.

use sqlx::{SqliteConnection, SqlitePool};

use evergreen_core::{OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem};

/// Repository for order reads and status updates.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Orders, newest first, optionally restricted to one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: Option<UserId>) -> Result<Vec<Order>, RepositoryError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, Order>(
                    "SELECT * FROM orders WHERE user_id = ? ORDER BY created DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created DESC, id DESC")
                    .fetch_all(self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Items of one order, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: &str) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Set an order's status. Any status is reachable from any other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?, updated = datetime('now') WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }
}

// Connection-level insert helpers for the order-placement transaction.

/// Insert a fresh order row with zero total.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut SqliteConnection,
    id: &str,
    user_id: UserId,
    status: OrderStatus,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO orders (id, user_id, status, total_sum) VALUES (?, ?, ?, 0)")
        .bind(id)
        .bind(user_id)
        .bind(status.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert one order line with its captured unit price.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order_item(
    conn: &mut SqliteConnection,
    order_id: &str,
    product_id: &str,
    quantity: i64,
    price: f64,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)")
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .execute(conn)
        .await?;
    Ok(())
}

/// Store the accumulated total on the order row.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_order_total(
    conn: &mut SqliteConnection,
    order_id: &str,
    total_sum: f64,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE orders SET total_sum = ? WHERE id = ?")
        .bind(total_sum)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}
