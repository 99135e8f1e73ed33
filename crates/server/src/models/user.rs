//! User row model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use evergreen_core::{UserId, UserRole};

/// A registered account, customer or admin.
///
/// `password_hash` never leaves the server; response mapping strips it.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub is_deleted: bool,
}

impl User {
    /// Whether this account has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role
            .parse::<UserRole>()
            .is_ok_and(UserRole::is_admin)
    }
}
