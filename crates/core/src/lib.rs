//! Evergreen Core - Shared types library.
//!
//! This crate provides common types used across all Evergreen Shop components:
//! - `server` - The storefront/admin HTTP API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, role and order-status enums, slug normalization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
