//! Request extractors for authentication.

pub mod auth;

pub use auth::{AUTH_COOKIE, CurrentUser, RequireAdmin};
