//! Database row models.
//!
//! These structs map 1:1 onto the SQLite schema in `migrations/`. Client
//! facing shapes live next to the route handlers, not here.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Category, Product, Service};
pub use order::{Order, OrderItem};
pub use user::User;
