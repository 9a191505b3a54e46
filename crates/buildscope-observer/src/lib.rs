//! Observer API server for the buildscope task graph viewer.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Producer feed** (`/log_stream`, `/api/feed/*`): a build tool pushes
//!   event records in, and viewers long-poll them out in batches ending
//!   with a `quit_key` sentinel
//! - **REST endpoints** for the graph and playback status as of the
//!   playback cursor, plus playback control commands
//! - **`WebSocket` endpoint** (`/ws/graph`) streaming live graph and
//!   status updates via [`tokio::sync::broadcast`]
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The timeline controller lives in the frame driver task. An
//! [`ObserverBridge`] registered on it publishes into [`AppState`], and
//! the handlers only read those snapshots. Control commands travel the
//! other way over an `mpsc` channel.
//!
//! [`ObserverBridge`]: bridge::ObserverBridge

pub mod bridge;
pub mod error;
pub mod handlers;
pub mod producer;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use bridge::ObserverBridge;
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{ObserverHandle, spawn_observer};
pub use state::{AppState, LiveUpdate};
