//! Core types for Evergreen Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use slug::normalize_slug;
pub use status::{OrderStatus, UserRole};
