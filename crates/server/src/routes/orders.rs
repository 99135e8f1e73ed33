//! Order placement, listing and the admin status update.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::SqlitePool;

use evergreen_core::{OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::db::catalog::CatalogRepository;
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::order::Order;
use crate::routes::cart::{CartItemPayload, validate_lines};
use crate::routes::views::{OrderItemOut, OrderOut, epoch_seconds};
use crate::services::orders;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/{id}", patch(update_status))
}

/// Assemble the full order view: items with their products, plus the
/// customer.
async fn order_view(pool: &SqlitePool, order: Order) -> Result<OrderOut> {
    let catalog = CatalogRepository::new(pool);
    let items = OrderRepository::new(pool).items(&order.id).await?;

    let mut out_items = Vec::with_capacity(items.len());
    for item in items {
        // Foreign keys guarantee the product row; a miss is corruption.
        let product = catalog.get_product(&item.product_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "order item references missing product {}",
                item.product_id
            ))
        })?;
        out_items.push(OrderItemOut {
            product: product.into(),
            quantity: item.quantity,
            price: item.price,
        });
    }

    let customer = UserRepository::new(pool)
        .get_by_id(order.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("order {} references missing user", order.id))
        })?;

    Ok(OrderOut {
        id: order.id,
        status: order.status,
        total_sum: order.total_sum,
        created_at: epoch_seconds(order.created),
        customer: customer.into(),
        items: out_items,
    })
}

#[derive(Debug, Deserialize)]
struct PlaceOrderRequest {
    items: Vec<CartItemPayload>,
}

async fn place_order(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderOut>)> {
    let lines = validate_lines(body.items)?;
    let order_id = orders::place_order(state.pool(), user.id, &lines).await?;

    let order = OrderRepository::new(state.pool())
        .get(&order_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("placed order {order_id} not readable")))?;

    Ok((StatusCode::CREATED, Json(order_view(state.pool(), order).await?)))
}

#[derive(Debug, Deserialize)]
struct OrdersQuery {
    customer_id: Option<String>,
}

async fn list_orders(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderOut>>> {
    let requested = match query.customer_id.as_deref() {
        Some(raw) => Some(raw.parse::<UserId>().map_err(|_| {
            AppError::BadRequest(format!("invalid customer_id: {raw}"))
        })?),
        None => None,
    };

    let filter = if user.is_admin() {
        requested
    } else {
        match requested {
            Some(id) if id != user.id => {
                return Err(AppError::Forbidden(
                    "customers may only list their own orders".to_owned(),
                ));
            }
            _ => Some(user.id),
        }
    };

    let rows = OrderRepository::new(state.pool()).list(filter).await?;
    let mut views = Vec::with_capacity(rows.len());
    for order in rows {
        views.push(order_view(state.pool(), order).await?);
    }
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
struct OrderStatusUpdateRequest {
    status: OrderStatus,
}

async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<OrderStatusUpdateRequest>,
) -> Result<Json<OrderOut>> {
    let order = OrderRepository::new(state.pool())
        .update_status(&id, body.status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order".to_owned()),
            other => AppError::Repository(other),
        })?;

    Ok(Json(order_view(state.pool(), order).await?))
}
