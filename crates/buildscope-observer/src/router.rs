//! Axum router construction for the Observer API.
//!
//! Assembles all routes (producer feed, REST, `WebSocket`) into a single
//! [`Router`] with CORS middleware enabled so a browser front end served
//! from elsewhere can reach it.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /log_stream` -- producer long-poll
/// - `POST /api/feed/events` -- queue events for `/log_stream`
/// - `POST /api/feed/finish` -- close the producer stream
/// - `GET /api/graph` -- current nodes and edges
/// - `GET /api/playback` -- current playback status
/// - `POST /api/playback/control` -- playback command
/// - `GET /ws/graph` -- `WebSocket` live update stream
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Producer feed
        .route("/log_stream", get(handlers::log_stream))
        .route("/api/feed/events", post(handlers::push_events))
        .route("/api/feed/finish", post(handlers::finish_feed))
        // Playback
        .route("/api/graph", get(handlers::get_graph))
        .route("/api/playback", get(handlers::get_playback))
        .route("/api/playback/control", post(handlers::control))
        // WebSocket
        .route("/ws/graph", get(ws::ws_graph))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
