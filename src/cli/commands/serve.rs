use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::images::FsImageStore;

/// Open the store, serve until ctrl-c, then close the store
pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Warehouse API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        warn!("JWT_SECRET is not set; every protected request will be rejected");
    }

    let backend = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open store")?;
    info!("Using {} store", backend.name());

    let images = Arc::new(FsImageStore::new(&config.images.directory));
    let state = AppState::new(backend, images, &config.security.jwt_secret);
    let router = app(state.clone(), &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Warehouse API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    state.warehouse.store().close().await;
    info!("Store closed, shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
