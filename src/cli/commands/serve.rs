use std::sync::Arc;

use anyhow::Context;

use crate::cli::commands::lookup::registry_lookup;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::services::HttpObjectStorage;
use crate::{app, AppState};

pub async fn handle(config: AppConfig, port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    tracing::info!("Starting Logbook API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    if migrate {
        DatabaseManager::run_migrations(&pool).await?;
    }

    let store = Arc::new(PgStore::new(pool.clone()));
    let storage = Arc::new(HttpObjectStorage::new(&config.storage, config.storage_timeout())?);
    let lookup = registry_lookup(&config)?;

    let port = port.unwrap_or(config.server.port);
    let state = AppState::new(config, store, storage, lookup).with_pool(pool);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Logbook API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Logbook API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
