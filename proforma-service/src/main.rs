use std::net::SocketAddr;
use std::sync::Arc;

use proforma_core::observability::init_tracing;
use proforma_service::config::{ServiceConfig, StoreBackend};
use proforma_service::services::init_metrics;
use proforma_service::startup::{build_router, AppState};
use proforma_service::store::{MemoryStore, PgStore, SharedStore};
use tokio::net::TcpListener;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Metrics recorder first, before anything records.
    init_metrics();

    let config = ServiceConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("proforma-service", &config.common.log_level);

    let store: SharedStore = match config.store.backend {
        StoreBackend::Postgres => {
            let pg = PgStore::new(
                &config.database.url,
                config.database.max_connections,
                config.database.min_connections,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to Postgres: {}", e);
                std::io::Error::other(format!("Database connection error: {}", e))
            })?;

            pg.run_migrations().await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                std::io::Error::other(format!("Migration error: {}", e))
            })?;

            Arc::new(pg)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState { store };
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind listener to {}: {}", addr, e);
        e
    })?;
    tracing::info!("proforma-service listening on port {}", config.common.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
