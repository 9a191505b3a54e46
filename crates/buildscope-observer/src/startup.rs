//! Observer server startup helper for embedding in the viewer.
//!
//! Provides [`spawn_observer`] which launches the Observer HTTP +
//! `WebSocket` server on a background Tokio task. The viewer binary calls
//! this during startup so the API runs concurrently with the frame driver.
//!
//! # Usage
//!
//! ```rust,ignore
//! use buildscope_observer::startup::spawn_observer;
//! use buildscope_observer::state::AppState;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(None));
//! let observer = spawn_observer(&config.observer, state, shutdown_rx).await?;
//! // The server is now running on observer.addr.
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use buildscope_core::config::ObserverConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::server::{ServerError, bind_listener, serve};
use crate::state::AppState;

/// A running background Observer server.
#[derive(Debug)]
pub struct ObserverHandle {
    /// The address actually bound (useful when port `0` was requested).
    pub addr: SocketAddr,
    /// The serving task. It ends after the shutdown signal fires.
    pub task: JoinHandle<()>,
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The listener is bound before the task is spawned, so bind failures are
/// reported here rather than logged from the background.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound.
pub async fn spawn_observer(
    config: &ObserverConfig,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<ObserverHandle, ServerError> {
    let listener = bind_listener(config).await?;
    let addr = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: format!("{}:{}", config.host, config.port),
        source,
    })?;

    let task = tokio::spawn(async move {
        if let Err(e) = serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok(ObserverHandle { addr, task })
}
