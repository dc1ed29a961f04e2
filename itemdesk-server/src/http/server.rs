//! Axum server setup
//!
//! Server skeleton with:
//! - Item routes plus an HTML 404 fallback
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::flash::FlashKey;
use super::routes;
use crate::config::ServerConfig;
use crate::db::ItemStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub flash_key: FlashKey,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, flash_key: FlashKey) -> Self {
        Self { store, flash_key }
    }
}

impl FromRef<Arc<AppState>> for FlashKey {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.flash_key.clone()
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::items::router())
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let store = MySqlItemStore::new(ConnectionProvider::new(&db_config));
/// run_server(Arc::new(store), ServerConfig::default()).await?;
/// ```
pub async fn run_server(store: Arc<dyn ItemStore>, config: ServerConfig) -> Result<(), ServerError> {
    let flash_key = match &config.secret_key {
        Some(secret) => FlashKey::new(secret),
        None => {
            tracing::warn!("No secret key configured - using a random one, notices will not survive a restart");
            FlashKey::generate()
        }
    };

    let app = build_router(AppState::new(store, flash_key));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
