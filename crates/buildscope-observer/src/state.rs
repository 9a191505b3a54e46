//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the producer queue behind `/log_stream`, the latest
//! graph and playback snapshots the REST endpoints serve, the broadcast
//! channel feeding `WebSocket` clients, and the command channel into the
//! task that owns the timeline controller.
//!
//! Snapshots live in [`watch`] channels so the presentation bridge can
//! publish from synchronous code and handlers read without awaiting.

use std::time::Duration;

use buildscope_core::controls::ControlCommand;
use buildscope_types::{GraphSnapshot, PlaybackMode, PlaybackStatus};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, watch};

use crate::producer::ProducerQueue;

/// Capacity of the broadcast channel for live updates.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// How long a `/log_stream` request waits for events before answering
/// with an empty batch.
pub const DEFAULT_LONG_POLL_HOLD: Duration = Duration::from_secs(30);

/// JSON message pushed over the `WebSocket`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveUpdate {
    /// The full graph after the fold advanced.
    Graph(GraphSnapshot),
    /// The playback status after it changed.
    Playback(PlaybackStatus),
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState {
    /// Broadcast sender for live updates.
    pub tx: broadcast::Sender<LiveUpdate>,
    /// Latest graph published by the timeline.
    pub graph: watch::Sender<GraphSnapshot>,
    /// Latest playback status published by the timeline.
    pub playback: watch::Sender<PlaybackStatus>,
    /// Records waiting for `/log_stream`.
    pub producer: ProducerQueue,
    /// Command channel into the timeline task, when one is attached.
    pub commands: Option<mpsc::Sender<ControlCommand>>,
    /// When this server session started.
    pub started_at: DateTime<Utc>,
    /// Hold time for `/log_stream` requests.
    pub long_poll_hold: Duration,
}

impl AppState {
    /// Create state with an empty graph and no timeline attached.
    ///
    /// `respire_details_dir` goes into the producer's opening
    /// `StartupParams` record.
    pub fn new(respire_details_dir: Option<&str>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (graph, _) = watch::channel(GraphSnapshot::default());
        let (playback, _) = watch::channel(PlaybackStatus {
            mode: PlaybackMode::PlayingAtEnd,
            current_time: 0.0,
            end_time: 0.0,
            events_played: 0,
            events_fetched: 0,
            stream_finished: false,
        });
        Self {
            tx,
            graph,
            playback,
            producer: ProducerQueue::new(respire_details_dir),
            commands: None,
            started_at: Utc::now(),
            long_poll_hold: DEFAULT_LONG_POLL_HOLD,
        }
    }

    /// Attach the command channel of a running timeline.
    #[must_use]
    pub fn with_commands(mut self, commands: mpsc::Sender<ControlCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Override the `/log_stream` hold time.
    #[must_use]
    pub const fn with_long_poll_hold(mut self, hold: Duration) -> Self {
        self.long_poll_hold = hold;
        self
    }

    /// Subscribe to live updates.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveUpdate> {
        self.tx.subscribe()
    }

    /// Publish an update to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, update: LiveUpdate) -> usize {
        self.tx.send(update).unwrap_or(0)
    }

    /// Replace the graph snapshot and broadcast it.
    pub fn publish_graph(&self, snapshot: GraphSnapshot) {
        self.graph.send_replace(snapshot.clone());
        self.broadcast(LiveUpdate::Graph(snapshot));
    }

    /// Replace the playback status and broadcast it, unless it is
    /// unchanged. Returns whether it changed.
    pub fn publish_playback(&self, status: PlaybackStatus) -> bool {
        let changed = self.playback.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status.clone();
                true
            }
        });
        if changed {
            self.broadcast(LiveUpdate::Playback(status));
        }
        changed
    }
}
