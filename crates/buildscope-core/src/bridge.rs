//! Outbound contract between the timeline controller and presentation.
//!
//! Two kinds of listener can be registered on a
//! [`TimelineController`](crate::timeline::TimelineController):
//!
//! - A [`MutationObserver`] is told that *something* changed and pulls what
//!   it needs (mode, times, counters) from the controller it is handed.
//! - A [`GraphUpdateSink`] receives the full node and edge collections each
//!   time the fold index advances. It never receives deltas.
//!
//! Plain closures implement both traits, and [`LoggingRenderer`] is a sink
//! that renders to the log.

use std::collections::BTreeMap;

use buildscope_types::{Edge, Node, NodeState, PlaybackMode, count_states};
use tracing::{debug, info};

use crate::timeline::TimelineController;

/// Listener notified after every state-affecting controller operation.
pub trait MutationObserver: Send {
    /// Called with the controller after it changed.
    fn on_mutation(&mut self, timeline: &TimelineController);
}

impl<F> MutationObserver for F
where
    F: FnMut(&TimelineController) + Send,
{
    fn on_mutation(&mut self, timeline: &TimelineController) {
        self(timeline);
    }
}

/// Listener that receives the graph whenever newly crossed events were
/// folded into it.
pub trait GraphUpdateSink: Send {
    /// Called with the complete current node and edge collections.
    fn on_graph_update(&mut self, nodes: &[Node], edges: &[Edge]);
}

impl<F> GraphUpdateSink for F
where
    F: FnMut(&[Node], &[Edge]) + Send,
{
    fn on_graph_update(&mut self, nodes: &[Node], edges: &[Edge]) {
        self(nodes, edges);
    }
}

/// A renderer that writes to the tracing log instead of a screen.
///
/// As a [`GraphUpdateSink`] it logs per-state node counts at `debug`. As a
/// [`MutationObserver`] it logs the playback status at `info` whenever the
/// mode or the end-of-stream flag changes.
#[derive(Debug, Default)]
pub struct LoggingRenderer {
    last_mode: Option<PlaybackMode>,
    last_finished: bool,
}

impl LoggingRenderer {
    /// Create a renderer that has not logged anything yet.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Nodes that reached one of the completed terminals.
fn completed_count(counts: &BTreeMap<NodeState, usize>) -> usize {
    counts
        .iter()
        .filter(|(state, _)| state.is_completed())
        .map(|(_, count)| count)
        .sum()
}

/// `state=count` pairs in legend order, e.g. `executing=2 completed-error=1`.
fn summarize_states(counts: &BTreeMap<NodeState, usize>) -> String {
    counts
        .iter()
        .map(|(state, count)| format!("{state}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl GraphUpdateSink for LoggingRenderer {
    fn on_graph_update(&mut self, nodes: &[Node], edges: &[Edge]) {
        let counts = count_states(nodes);
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            completed = completed_count(&counts),
            states = %summarize_states(&counts),
            "Graph updated"
        );
    }
}

impl MutationObserver for LoggingRenderer {
    fn on_mutation(&mut self, timeline: &TimelineController) {
        let mode = timeline.mode();
        let finished = timeline.stream_finished();
        if self.last_mode == Some(mode) && self.last_finished == finished {
            return;
        }
        self.last_mode = Some(mode);
        self.last_finished = finished;

        info!(
            mode = %mode,
            current_time = timeline.current_time(),
            end_time = timeline.end_time(),
            events_played = timeline.events_played(),
            events_fetched = timeline.events_fetched(),
            stream_finished = finished,
            "Playback status"
        );
    }
}
