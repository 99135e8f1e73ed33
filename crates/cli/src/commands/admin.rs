//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! evergreen-cli admin create -u admin3 -p secret -e admin3@evergreen.shop
//! ```

use thiserror::Error;

use evergreen_core::{Email, EmailError, UserRole};
use evergreen_server::config::{ConfigError, ServerConfig};
use evergreen_server::db::users::{NewUser, UserRepository};
use evergreen_server::db::{self, RepositoryError};
use evergreen_server::services::auth::hash_password;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to hash password")]
    PasswordHash,
}

/// Create an admin account.
///
/// # Errors
///
/// Returns `AdminError` on bad input, a taken username, or database
/// failures.
pub async fn create(username: &str, password: &str, email: &str) -> Result<(), AdminError> {
    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::migrate(&pool).await?;

    let username = username.trim().to_lowercase();
    let email = Email::parse(email)?;
    let password_hash = hash_password(password).map_err(|_| AdminError::PasswordHash)?;

    let user = UserRepository::new(&pool)
        .create(NewUser {
            full_name: username.clone(),
            username,
            email: email.into_inner(),
            password_hash,
            role: UserRole::Admin,
            phone: String::new(),
            address: String::new(),
        })
        .await?;

    tracing::info!("Created admin account {} (id {})", user.username, user.id);
    Ok(())
}
