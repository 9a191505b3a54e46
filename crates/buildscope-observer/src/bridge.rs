//! Presentation bridge from a timeline controller into [`AppState`].
//!
//! [`ObserverBridge`] is registered on the controller as both a graph sink
//! and a mutation observer. It runs inside the frame driver, so it only
//! uses non-blocking publishes.

use std::sync::Arc;

use buildscope_core::bridge::{GraphUpdateSink, MutationObserver};
use buildscope_core::timeline::TimelineController;
use buildscope_types::{Edge, GraphSnapshot, Node};

use crate::state::AppState;

/// Publishes graph updates and playback status to the observer.
#[derive(Debug, Clone)]
pub struct ObserverBridge {
    state: Arc<AppState>,
}

impl ObserverBridge {
    /// Create a bridge that publishes into `state`.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Register one bridge as sink and another as observer on `timeline`,
    /// and publish its current status.
    pub fn attach(timeline: &mut TimelineController, state: &Arc<AppState>) {
        let bridge = Self::new(Arc::clone(state));
        state.publish_graph(timeline.graph().snapshot());
        state.publish_playback(timeline.status());
        timeline.register_graph_sink(bridge.clone());
        timeline.register_mutation_observer(bridge);
    }
}

impl GraphUpdateSink for ObserverBridge {
    fn on_graph_update(&mut self, nodes: &[Node], edges: &[Edge]) {
        self.state.publish_graph(GraphSnapshot {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
        });
    }
}

impl MutationObserver for ObserverBridge {
    fn on_mutation(&mut self, timeline: &TimelineController) {
        self.state.publish_playback(timeline.status());
    }
}
