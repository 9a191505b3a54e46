//! The graph state reducer: a replayable fold from events to nodes and edges.
//!
//! [`GraphState`] owns every derived collection (nodes, edges, the id and
//! output indices, and the startup configuration). They change only through
//! [`GraphState::apply`] and [`GraphState::reset`], so folding the same
//! prefix of a log from an empty state always yields the same graph no
//! matter how the prefix was split into batches.
//!
//! # Visibility
//!
//! Once a `StartupParams` event names a `respire_details_dir`, tasks whose
//! first output lives under that directory are hidden, together with every
//! later lifecycle event that refers to them. See
//! [`GraphState::should_ignore`].

use std::collections::HashMap;

use buildscope_types::{
    CreateNode, Edge, Event, EventKind, GraphSnapshot, Node, NodeId, NodeState, StartupParams,
};
use tracing::{debug, error, info};

/// Derived graph: the fold of an event prefix.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    /// Latest startup configuration received, if any.
    startup_params: Option<StartupParams>,

    /// Nodes in creation order.
    nodes: Vec<Node>,

    /// Edges in creation order.
    edges: Vec<Edge>,

    /// Node id to position in `nodes`.
    node_index: HashMap<NodeId, usize>,

    /// Output file to the position of the node that produces it.
    output_owners: HashMap<String, usize>,
}

impl GraphState {
    /// An empty graph with no startup configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all derived state, including the startup configuration.
    pub fn reset(&mut self) {
        self.startup_params = None;
        self.nodes.clear();
        self.edges.clear();
        self.node_index.clear();
        self.output_owners.clear();
    }

    // -----------------------------------------------------------------------
    // Filtering
    // -----------------------------------------------------------------------

    /// The configured details directory, when visibility filtering is active.
    pub fn details_dir(&self) -> Option<&str> {
        self.startup_params
            .as_ref()
            .and_then(|params| params.respire_details_dir.as_deref())
    }

    /// Whether `event` would be skipped if applied now.
    ///
    /// Nothing is ignored until a details directory is configured. After
    /// that, creation events are ignored when their first output is under
    /// the details directory, and every other event is ignored unless it
    /// refers to a node that already exists. Startup configuration is never
    /// ignored.
    pub fn should_ignore(&self, event: &Event) -> bool {
        let Some(details_dir) = self.details_dir() else {
            return false;
        };

        match event.kind() {
            EventKind::StartupParams(_) => false,
            EventKind::CreateSystemCommandNode(create) => create
                .outputs
                .first()
                .is_some_and(|output| output.starts_with(details_dir)),
            _ => event
                .node_id()
                .is_none_or(|id| !self.node_index.contains_key(id)),
        }
    }

    // -----------------------------------------------------------------------
    // Folding
    // -----------------------------------------------------------------------

    /// Fold `events` into the graph, in order.
    pub fn apply(&mut self, events: &[Event]) {
        for event in events {
            self.apply_one(event);
        }
    }

    fn apply_one(&mut self, event: &Event) {
        if let EventKind::Untyped { record } = event.kind() {
            error!(%record, "Event has no \"type\" field, skipping");
            return;
        }

        if self.should_ignore(event) {
            return;
        }

        match event.kind() {
            EventKind::StartupParams(params) => {
                info!(
                    respire_details_dir = ?params.respire_details_dir,
                    extra_keys = params.extra.len(),
                    "Received startup params"
                );
                self.startup_params = Some(params.clone());
            }
            EventKind::CreateSystemCommandNode(create) => self.create_node(create),
            kind => {
                let Some(node) = event
                    .node_id()
                    .and_then(|id| self.node_index.get(id))
                    .and_then(|&index| self.nodes.get_mut(index))
                else {
                    return;
                };
                if let Some(next) = transition(node.state, kind) {
                    node.state = next;
                }
            }
        }
    }

    fn create_node(&mut self, create: &CreateNode) {
        if self.node_index.contains_key(&create.id) {
            debug!(id = %create.id, "Duplicate node creation ignored");
            return;
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            id: create.id.clone(),
            title: create.outputs.first().cloned().unwrap_or_default(),
            outputs: create.outputs.clone(),
            inputs: create.inputs.clone(),
            command: create.command.clone(),
            state: NodeState::Inactive,
        });
        self.node_index.insert(create.id.clone(), index);
        for output in &create.outputs {
            self.output_owners.insert(output.clone(), index);
        }

        // Edges resolve against producers known right now and are never
        // revisited when a producer appears later.
        for input in &create.inputs {
            let Some(producer) = self
                .output_owners
                .get(input)
                .and_then(|&owner| self.nodes.get(owner))
            else {
                continue;
            };
            self.edges.push(Edge {
                source: create.id.clone(),
                target: producer.id.clone(),
                via: input.clone(),
            });
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index
            .get(id)
            .and_then(|&index| self.nodes.get(index))
    }

    /// Latest startup configuration received, if any.
    pub const fn startup_params(&self) -> Option<&StartupParams> {
        self.startup_params.as_ref()
    }

    /// Owned copy of the node and edge collections.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}

/// Lifecycle transition for a known node, or `None` to leave it unchanged.
fn transition(current: NodeState, kind: &EventKind) -> Option<NodeState> {
    match kind {
        EventKind::ScanningDependencies { dry_run: false, .. } => {
            Some(NodeState::ScanningDependencies)
        }
        EventKind::ExecutingCommand { dry_run: true, .. } => Some(NodeState::ActionPending),
        EventKind::ExecutingCommand { dry_run: false, .. } => Some(NodeState::Executing),
        EventKind::ProcessingComplete { error: Some(_), .. } => Some(NodeState::CompletedError),
        EventKind::ProcessingComplete { .. } if !current.is_running() => {
            Some(NodeState::CompletedUpToDate)
        }
        EventKind::ProcessingComplete { dry_run: false, .. } => Some(NodeState::CompletedSuccess),
        _ => None,
    }
}
