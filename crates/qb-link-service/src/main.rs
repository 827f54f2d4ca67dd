//! qb-link service - links local customer records to QuickBooks Online.
//!
//! This is the main entry point for the qb-link service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qb_link_service::{create_router, AppState, ServiceConfig};
use qb_link_store::{PgStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,qb_link_service=debug,qb_link_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting qb-link service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        environment = ?config.quickbooks.environment,
        realm_configured = %config.quickbooks.realm_id.is_some(),
        database_configured = %config.database.is_some(),
        "Service configuration loaded"
    );

    let store = open_store(&config).await?;

    // Build app state
    let state = AppState::new(store, config.clone())?;

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// PostgreSQL when a database host is configured, `RocksDB` otherwise.
async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if let Some(database) = &config.database {
        tracing::info!(host = %database.host, name = %database.name, "Connecting to PostgreSQL");
        let store = PgStore::connect(database.connect_options()).await?;
        store.migrate().await?;
        return Ok(Arc::new(store));
    }

    open_embedded_store(config)
}

#[cfg(feature = "rocksdb-backend")]
fn open_embedded_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    Ok(Arc::new(qb_link_store::RocksStore::open(&config.data_dir)?))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_embedded_store(_config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    Err("no database host configured and the RocksDB backend is not compiled in".into())
}
