//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] evergreen_core::EmailError),

    /// Invalid credentials (wrong password or unknown user).
    #[error("invalid login/password pair")]
    InvalidCredentials,

    /// Username or email missing from a registration.
    #[error("username and email are required")]
    MissingFields,

    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Email already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
