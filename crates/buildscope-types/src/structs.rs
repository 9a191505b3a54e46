//! Derived graph entities and playback status records.
//!
//! These are the values the replay engine hands to renderers. They are owned
//! copies built by the reducer, never aliases of wire events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{NodeState, PlaybackMode};
use crate::ids::NodeId;

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A task node derived from a `CreateSystemCommandNode` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Node {
    /// Identity, equal to the creation event's id.
    pub id: NodeId,
    /// Display title (the first output, or empty if there is none).
    pub title: String,
    /// Files the task writes.
    pub outputs: Vec<String>,
    /// Files the task reads.
    pub inputs: Vec<String>,
    /// Command line, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Current lifecycle state.
    pub state: NodeState,
}

/// A dependency edge from a dependent node to the producer of one of its
/// inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Edge {
    /// The node that reads the input.
    pub source: NodeId,
    /// The node that produces the input.
    pub target: NodeId,
    /// The input file that links the two.
    pub via: String,
}

/// The full node and edge collections at one point in build time.
///
/// Sent whole (not as a delta) every time the fold advances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GraphSnapshot {
    /// Nodes in creation order.
    pub nodes: Vec<Node>,
    /// Edges in creation order.
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Number of nodes in each state. See [`count_states`].
    pub fn state_counts(&self) -> BTreeMap<NodeState, usize> {
        count_states(&self.nodes)
    }
}

/// Number of nodes in each state. States with no nodes are omitted.
pub fn count_states(nodes: &[Node]) -> BTreeMap<NodeState, usize> {
    let mut counts = BTreeMap::new();
    for node in nodes {
        let entry = counts.entry(node.state).or_insert(0_usize);
        *entry = entry.saturating_add(1);
    }
    counts
}

// ---------------------------------------------------------------------------
// Playback status
// ---------------------------------------------------------------------------

/// Everything a timeline widget needs to redraw itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlaybackStatus {
    /// Current playback mode.
    pub mode: PlaybackMode,
    /// Cursor position in build-time seconds.
    pub current_time: f64,
    /// Time of the latest received event, in build-time seconds.
    pub end_time: f64,
    /// Number of events folded into the graph.
    pub events_played: usize,
    /// Number of events received from the feed.
    pub events_fetched: usize,
    /// Whether the feed has signalled end-of-stream.
    pub stream_finished: bool,
}

impl PlaybackStatus {
    /// Cursor position as a fraction of the end time, clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.current_time >= self.end_time {
            return 1.0;
        }
        (self.current_time / self.end_time).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn node(id: &str, state: NodeState) -> Node {
        Node {
            id: NodeId::from(id),
            title: format!("out/{id}"),
            outputs: vec![format!("out/{id}")],
            inputs: Vec::new(),
            command: None,
            state,
        }
    }

    #[test]
    fn state_counts_group_by_state() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                node("1", NodeState::Executing),
                node("2", NodeState::Executing),
                node("3", NodeState::CompletedError),
            ],
            edges: Vec::new(),
        };
        let counts = snapshot.state_counts();
        assert_eq!(counts.get(&NodeState::Executing), Some(&2));
        assert_eq!(counts.get(&NodeState::CompletedError), Some(&1));
        assert_eq!(counts.get(&NodeState::Inactive), None);
    }

    #[test]
    fn progress_is_clamped() {
        let mut status = PlaybackStatus {
            mode: PlaybackMode::Paused,
            current_time: 5.0,
            end_time: 10.0,
            events_played: 0,
            events_fetched: 0,
            stream_finished: false,
        };
        assert_eq!(status.progress(), 0.5);
        status.current_time = 12.0;
        assert_eq!(status.progress(), 1.0);
        status.current_time = 0.0;
        assert_eq!(status.progress(), 0.0);
    }

    #[test]
    fn node_omits_missing_command() {
        let json = serde_json::to_value(node("1", NodeState::Inactive)).unwrap();
        assert!(json.get("command").is_none());
        assert_eq!(json["state"], "inactive");
    }
}
