//! Cart estimation endpoint.

use std::collections::HashMap;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::services::orders::{self, CartLine};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/cart/estimate", post(estimate))
}

/// One cart line as sent by clients; `productId` is the legacy spelling.
#[derive(Debug, Deserialize)]
pub struct CartItemPayload {
    #[serde(alias = "productId")]
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
struct CartRequest {
    items: Vec<CartItemPayload>,
}

#[derive(Debug, Serialize)]
struct CartEstimateResponse {
    total_items: i64,
    total_sum: f64,
    currency: &'static str,
    breakdown: HashMap<String, f64>,
}

/// Convert payload lines into service-layer lines, enforcing quantity
/// bounds.
pub fn validate_lines(items: Vec<CartItemPayload>) -> Result<Vec<CartLine>> {
    items
        .into_iter()
        .map(|item| {
            if !(1..=99).contains(&item.quantity) {
                return Err(AppError::BadRequest(format!(
                    "quantity must be between 1 and 99, got {}",
                    item.quantity
                )));
            }
            Ok(CartLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
        })
        .collect()
}

async fn estimate(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CartRequest>,
) -> Result<Json<CartEstimateResponse>> {
    let lines = validate_lines(body.items)?;
    let totals = orders::estimate_cart(state.pool(), &lines).await?;

    Ok(Json(CartEstimateResponse {
        total_items: totals.total_items,
        total_sum: totals.total_sum,
        currency: "RUB",
        breakdown: totals.breakdown,
    }))
}
