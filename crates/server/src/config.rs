//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; the defaults run a local dev instance out of the box.
//!
//! - `EVERGREEN_DATABASE_URL` - SQLite URL (default: `sqlite://evergreen.db`;
//!   generic `DATABASE_URL` is honored as a fallback)
//! - `EVERGREEN_HOST` - Bind address (default: 127.0.0.1)
//! - `EVERGREEN_PORT` - Listen port (default: 8090)
//! - `EVERGREEN_STATIC_DIR` - Directory served under `/static` and the
//!   upload target (default: `static`)
//! - `EVERGREEN_JWT_PRIVATE_KEY` - RS256 private key PEM path
//!   (default: `certs/jwt_private.pem`)
//! - `EVERGREEN_JWT_PUBLIC_KEY` - RS256 public key PEM path
//!   (default: `certs/jwt_public.pem`)
//! - `EVERGREEN_TOKEN_TTL_MINUTES` - Access token lifetime (default: 15)
//! - `EVERGREEN_ALLOWED_ORIGINS` - Comma-separated CORS origins
//!   (default: `http://localhost:8080,http://127.0.0.1:8080`)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database URL.
    pub database_url: SecretString,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Directory served at `/static`; uploads land in `uploads/` below it.
    pub static_dir: String,
    /// Path to the RS256 private key PEM (token signing).
    pub jwt_private_key_path: String,
    /// Path to the RS256 public key PEM (token verification).
    pub jwt_public_key_path: String,
    /// Access-token lifetime in minutes.
    pub token_ttl_minutes: i64,
    /// CORS allowlist.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("EVERGREEN_DATABASE_URL", "sqlite://evergreen.db");
        let host = get_env_or_default("EVERGREEN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("EVERGREEN_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("EVERGREEN_PORT", "8090")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("EVERGREEN_PORT".to_owned(), e.to_string()))?;
        let static_dir = get_env_or_default("EVERGREEN_STATIC_DIR", "static");
        let jwt_private_key_path =
            get_env_or_default("EVERGREEN_JWT_PRIVATE_KEY", "certs/jwt_private.pem");
        let jwt_public_key_path =
            get_env_or_default("EVERGREEN_JWT_PUBLIC_KEY", "certs/jwt_public.pem");
        let token_ttl_minutes = get_env_or_default("EVERGREEN_TOKEN_TTL_MINUTES", "15")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("EVERGREEN_TOKEN_TTL_MINUTES".to_owned(), e.to_string())
            })?;
        let allowed_origins = get_env_or_default(
            "EVERGREEN_ALLOWED_ORIGINS",
            "http://localhost:8080,http://127.0.0.1:8080",
        )
        .split(',')
        .map(|origin| origin.trim().to_owned())
        .filter(|origin| !origin.is_empty())
        .collect();

        Ok(Self {
            database_url,
            host,
            port,
            static_dir,
            jwt_private_key_path,
            jwt_public_key_path,
            token_ttl_minutes,
            allowed_origins,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get the database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str, default: &str) -> SecretString {
    if let Ok(value) = std::env::var(primary_key) {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from(default)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_produce_a_local_dev_config() {
        // Not using from_env() here: the process environment is shared
        // between tests.
        let config = ServerConfig {
            database_url: SecretString::from("sqlite://evergreen.db"),
            host: "127.0.0.1".parse().expect("parse host"),
            port: 8090,
            static_dir: "static".to_owned(),
            jwt_private_key_path: "certs/jwt_private.pem".to_owned(),
            jwt_public_key_path: "certs/jwt_public.pem".to_owned(),
            token_ttl_minutes: 15,
            allowed_origins: vec!["http://localhost:8080".to_owned()],
        };

        let addr = config.socket_addr();
        assert_eq!(addr.port(), 8090);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(config.database_url.expose_secret(), "sqlite://evergreen.db");
    }
}
