//! Shared application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::services::token::TokenCodec;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

struct StateInner {
    config: ServerConfig,
    pool: SqlitePool,
    tokens: TokenCodec,
}

impl AppState {
    /// Bundle configuration, database pool and token codec.
    #[must_use]
    pub fn new(config: ServerConfig, pool: SqlitePool, tokens: TokenCodec) -> Self {
        Self {
            inner: Arc::new(StateInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Token signer/verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenCodec {
        &self.inner.tokens
    }
}
