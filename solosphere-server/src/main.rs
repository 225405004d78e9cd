use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod query;
pub mod repository;
pub mod service;
pub mod store;

use crate::api::AppState;
use crate::auth::JwtAuthenticator;
use crate::auth::cookies::CookieConfig;
use crate::config::Config;
use crate::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solosphere_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SoloSphere server...");

    let config = Config::from_env()?;
    config.validate()?;

    let store = connect_store(&config).await?;
    let auth = Arc::new(JwtAuthenticator::new(
        config.token_secret.as_bytes(),
        config.token_ttl,
    ));
    let cookies = CookieConfig::for_environment(config.production);

    // Build router with all API endpoints
    let app = api::create_router(AppState::new(store, auth, cookies), &config.cors_origins);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(PgStore::new(pool)))
}
