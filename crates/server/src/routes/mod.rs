//! HTTP route handlers.
//!
//! Everything shop-facing lives under `/api/v1/shop`; health probes and the
//! static mount are attached at the root by [`crate::build_router`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod media;
pub mod orders;
pub mod views;

use axum::Router;

use crate::state::AppState;

/// All API routes under the `/api/v1/shop` prefix.
pub fn router() -> Router<AppState> {
    let shop = Router::new()
        .merge(auth::router())
        .merge(catalog::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(admin::router())
        .merge(media::router());

    Router::new().nest("/api/v1/shop", shop)
}
