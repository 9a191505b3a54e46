//! REST API endpoint handlers for the Observer server.
//!
//! Reads are served from the snapshots in [`AppState`]; control commands
//! are forwarded to the task that owns the timeline controller.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/log_stream` | Long-poll the producer queue |
//! | `POST` | `/api/feed/events` | Queue one event or an array of events |
//! | `POST` | `/api/feed/finish` | Close the producer stream |
//! | `GET` | `/api/graph` | Current nodes and edges |
//! | `GET` | `/api/playback` | Current playback status and node counts |
//! | `POST` | `/api/playback/control` | Send a playback command |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use buildscope_core::controls::ControlCommand;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing playback status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.playback.borrow().clone();
    let (node_count, edge_count, state_counts) = {
        let graph = state.graph.borrow();
        (graph.nodes.len(), graph.edges.len(), graph.state_counts())
    };
    let legend: String = state_counts
        .iter()
        .map(|(node_state, count)| {
            format!(
                "<li class=\"{node_state}\">{label}: {count}</li>",
                label = node_state.label()
            )
        })
        .collect();
    let queued = state.producer.queued().await;
    let producer = if state.producer.is_done().await {
        "DONE"
    } else {
        "OPEN"
    };
    let started_at = state.started_at.format("%Y-%m-%d %H:%M:%S UTC");
    let mode = status.mode;
    let current_time = format!("{:.3}", status.current_time);
    let end_time = format!("{:.3}", status.end_time);
    let played = status.events_played;
    let fetched = status.events_fetched;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Buildscope Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Buildscope Observer</h1>
    <p class="subtitle">Session started {started_at}</p>

    <div>
        <div class="metric"><div class="label">Mode</div><div class="value">{mode}</div></div>
        <div class="metric"><div class="label">Time (s)</div><div class="value">{current_time} / {end_time}</div></div>
        <div class="metric"><div class="label">Events</div><div class="value">{played} / {fetched}</div></div>
        <div class="metric"><div class="label">Nodes</div><div class="value">{node_count}</div></div>
        <div class="metric"><div class="label">Edges</div><div class="value">{edge_count}</div></div>
        <div class="metric"><div class="label">Producer</div><div class="value">{producer} ({queued})</div></div>
    </div>

    <h2>Node States</h2>
    <ul>{legend}</ul>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/graph">/api/graph</a> -- Current nodes and edges</li>
        <li>GET <a href="/api/playback">/api/playback</a> -- Playback status</li>
        <li>POST /api/playback/control -- Playback command</li>
        <li>GET /log_stream -- Event long-poll</li>
        <li>POST /api/feed/events -- Queue events</li>
        <li>POST /api/feed/finish -- Close the event stream</li>
        <li><code>ws://host:port/ws/graph</code> -- Live graph stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Producer feed
// ---------------------------------------------------------------------------

/// Hold until events are queued, then return all of them.
///
/// Returns `[]` if nothing arrives within the hold time, and `410 Gone`
/// once the final batch was delivered.
pub async fn log_stream(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Value>>, ObserverError> {
    let batch = state.producer.next_batch(state.long_poll_hold).await?;
    Ok(Json(batch))
}

/// Queue a single event object or an array of events.
pub async fn push_events(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ObserverError> {
    let records = match body {
        Value::Array(records) => records,
        record @ Value::Object(_) => vec![record],
        _ => {
            return Err(ObserverError::InvalidRequest(String::from(
                "expected an event object or an array of events",
            )));
        }
    };

    let queued = state.producer.push(records).await?;
    debug!(queued, "Events queued for /log_stream");

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "queued": queued })),
    ))
}

/// Close the producer stream. Repeated calls are harmless.
pub async fn finish_feed(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let newly_closed = state.producer.finish().await;
    if newly_closed {
        info!("Producer stream finishing");
    }
    Json(serde_json::json!({
        "ok": true,
        "already_finished": !newly_closed,
    }))
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// Return the graph as of the playback cursor.
pub async fn get_graph(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.graph.borrow().clone();
    Json(snapshot)
}

/// Return the playback status with its progress fraction and the number
/// of nodes in each state.
pub async fn get_playback(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.playback.borrow().clone();
    let state_counts = state.graph.borrow().state_counts();
    Json(serde_json::json!({
        "progress": status.progress(),
        "status": status,
        "state_counts": state_counts,
    }))
}

/// Forward a [`ControlCommand`] to the timeline task.
pub async fn control(
    State(state): State<Arc<AppState>>,
    Json(command): Json<ControlCommand>,
) -> Result<impl IntoResponse, ObserverError> {
    let commands = state
        .commands
        .as_ref()
        .ok_or_else(|| ObserverError::Unavailable(String::from("no timeline attached")))?;

    commands
        .send(command)
        .await
        .map_err(|err| ObserverError::Unavailable(format!("timeline stopped: {err}")))?;
    debug!(?command, "Control command forwarded");

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": command })),
    ))
}
