//! `docbin` server entry point.
//!
//! Builds the storage backend and document store from the environment, then
//! starts the Axum HTTP server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use docbin_core::store::DocumentStore;
use docbin_storage::{FilesystemBackend, MemoryBackend, StorageBackend};

use docbin_server::config::{ServerConfig, StorageBackendType};
use docbin_server::routes;
use docbin_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "docbin starting");

    let state = build_app_state(&config)?;
    let app = routes::router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "docbin server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("docbin server stopped");
    Ok(())
}

/// Build the shared application state.
fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let storage: Arc<dyn StorageBackend> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (documents will not persist)");
            Arc::new(MemoryBackend::new())
        }
        StorageBackendType::Filesystem { path } => {
            info!(path = %path.display(), "using filesystem storage");
            Arc::new(
                FilesystemBackend::open(path).context("failed to open document directory")?,
            )
        }
    };

    let store = DocumentStore::new(storage, config.documents.clone())
        .context("invalid document configuration")?;

    Ok(Arc::new(AppState {
        store,
        public_url: config.public_url.clone(),
    }))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
