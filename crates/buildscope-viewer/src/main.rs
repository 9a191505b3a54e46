//! Viewer binary for the buildscope task graph replay engine.
//!
//! This is the main entry point that wires together the event feed, the
//! timeline controller and its frame driver, and the observer API. It
//! loads configuration, starts every subsystem, and plays the build until
//! `Ctrl-C`, or until a replay finishes with nothing left to control it.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `buildscope.yaml` (or `BUILDSCOPE_CONFIG`)
//! 3. Install the `Ctrl-C` shutdown handler
//! 4. Start the observer server, if enabled
//! 5. Start the event feed (activity log or `/log_stream`)
//! 6. Run the frame driver
//! 7. Log the result

mod app;
mod error;

use std::sync::Arc;

use buildscope_core::config::ViewerConfig;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ViewerError;

/// Application entry point for the viewer.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the session fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("buildscope-viewer starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        feed_url = ?config.feed_url(),
        log_file = ?config.feed.log_file,
        observer_enabled = config.observer.enabled,
        observer_host = config.observer.host,
        observer_port = config.observer.port,
        frame_interval_ms = config.playback.frame_interval_ms,
        "Configuration loaded"
    );

    // 3. Shutdown on Ctrl-C.
    let shutdown = Arc::new(watch::channel(false).0);
    let ctrl_c = Arc::clone(&shutdown);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                ctrl_c.send_replace(true);
            }
            Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C"),
        }
    });

    // 4-7. Run the session.
    let summary = app::run(config, shutdown).await?;

    info!(
        end_reason = ?summary.end_reason,
        events_played = summary.status.events_played,
        events_fetched = summary.status.events_fetched,
        "buildscope-viewer shutdown complete"
    );

    Ok(())
}

/// Load the viewer configuration.
///
/// A missing file means defaults; environment overrides apply either way.
fn load_config() -> Result<ViewerConfig, ViewerError> {
    let config_path = ViewerConfig::path_from_env();
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    let config = ViewerConfig::load(&config_path)?;
    Ok(config)
}
