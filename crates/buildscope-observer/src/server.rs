//! Observer HTTP server lifecycle management.
//!
//! [`bind_listener`] claims the port, [`serve`] runs the Axum server on a
//! bound listener until the shutdown signal fires, and [`start_server`]
//! does both.

use std::sync::Arc;

use buildscope_core::config::ObserverConfig;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        /// The `host:port` that was requested.
        addr: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server encountered a fatal error while serving.
    #[error("serve error: {source}")]
    Serve {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Bind a TCP listener for the configured host and port.
///
/// The host may be a name such as `localhost`. Port `0` picks a free port.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be resolved or
/// bound.
pub async fn bind_listener(config: &ObserverConfig) -> Result<TcpListener, ServerError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the Observer API on `listener` until `shutdown` turns `true` or
/// its sender is dropped.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!("Observer server stopped");
    Ok(())
}

/// Start the Observer HTTP server and run it until shutdown.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(
    config: &ObserverConfig,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let listener = bind_listener(config).await?;
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Observer server listening");
    }
    serve(listener, state, shutdown).await
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        debug!("Shutdown sender dropped, stopping observer server");
    }
}
