pub mod app;
pub mod config;
pub mod courses;
pub mod db_mongo;
pub mod error;
pub mod health;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::app::{AppState, build_router};
use crate::config::Config;
use crate::db_mongo::MongoConnection;
use crate::db_mongo::queries::MongoCourseStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let connection = Arc::new(MongoConnection::new(&config.mongodb_uri, &config.db_name));

    // Start connecting now so the first request finds a warm client
    let warmup = connection.clone();
    tokio::spawn(async move {
        match warmup.client().await {
            Ok(_) => tracing::debug!("MongoDB client ready for database {}", warmup.db_name()),
            Err(e) => tracing::warn!("MongoDB not reachable at startup: {:#}", e),
        }
    });

    let store = Arc::new(MongoCourseStore::new(connection));
    let app = build_router(AppState::new(store, config.not_found));

    let listener = TcpListener::bind(config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;
    tracing::info!(
        "listening on {} (database: {}, not-found policy: {:?})",
        listener.local_addr()?,
        config.db_name,
        config.not_found
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::warn!("Received SIGTERM, shutting down");
        }
    }
}
