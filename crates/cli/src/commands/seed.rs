//! Demo dataset seeding command.
//!
//! # Usage
//!
//! ```bash
//! evergreen-cli seed
//! ```
//!
//! Migrates first, then seeds. A database that already holds categories is
//! left untouched.

use thiserror::Error;

use evergreen_server::config::{ConfigError, ServerConfig};
use evergreen_server::db;
use evergreen_server::seed::{self, SeedError};

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Migrate, then seed the demo dataset.
///
/// # Errors
///
/// Returns `SeedCommandError` if any step fails.
pub async fn run() -> Result<(), SeedCommandError> {
    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::migrate(&pool).await?;

    if seed::run(&pool).await? {
        tracing::info!("Demo dataset seeded");
    } else {
        tracing::info!("Demo dataset already present, nothing to do");
    }
    Ok(())
}
