//! Evergreen Shop - storefront and admin HTTP API.
//!
//! Serves the JSON API on port 8090 (configurable), backed by SQLite.
//! Migrations run and the demo dataset is seeded at startup, so a fresh
//! checkout answers requests immediately.

#![cfg_attr(not(test), forbid(unsafe_code))]

use evergreen_server::config::ServerConfig;
use evergreen_server::services::token::TokenCodec;
use evergreen_server::state::AppState;
use evergreen_server::{build_router, db, seed};

#[tokio::main]
async fn main() {
    // Default to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "evergreen_server=info,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    db::migrate(&pool).await.expect("Failed to run migrations");
    tracing::info!("Migrations applied");

    if seed::run(&pool).await.expect("Failed to seed demo data") {
        tracing::info!("Demo data seeded");
    } else {
        tracing::info!("Demo data already present, skipping seed");
    }

    let tokens = TokenCodec::from_key_files(
        &config.jwt_private_key_path,
        &config.jwt_public_key_path,
        config.token_ttl_minutes,
    )
    .expect("Failed to load JWT keys");

    let addr = config.socket_addr();
    let state = AppState::new(config, pool, tokens);
    let app = build_router(state);

    tracing::info!("shop API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
