//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! evergreen-cli migrate
//! ```
//!
//! Uses the same environment variables as the server
//! (`EVERGREEN_DATABASE_URL`, falling back to `DATABASE_URL`).

use thiserror::Error;

use evergreen_server::config::{ConfigError, ServerConfig};
use evergreen_server::db;

/// Errors that can occur during migration.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrateError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
