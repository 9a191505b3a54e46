//! Wire events produced by the build's activity log.
//!
//! Events arrive as loosely-typed JSON records. [`Event::from_json`] turns
//! each record into a tagged [`EventKind`] with explicit optional fields, so
//! the reducer can pattern-match instead of probing for keys. Decoding never
//! fails: records without a usable `type` become [`EventKind::Untyped`] and
//! unknown types become [`EventKind::Other`], both of which the reducer
//! treats as no-ops.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::NodeId;

/// Conversion factor from wire timestamps to build-time seconds.
pub const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

/// Wire name of the startup configuration event.
pub const STARTUP_PARAMS: &str = "StartupParams";
/// Wire name of the task creation event.
pub const CREATE_SYSTEM_COMMAND_NODE: &str = "CreateSystemCommandNode";
/// Wire name of the dependency scan event.
pub const SCANNING_DEPENDENCIES: &str = "ScanningDependencies";
/// Wire name of the command execution event.
pub const EXECUTING_COMMAND: &str = "ExecutingCommand";
/// Wire name of the completion event.
pub const PROCESSING_COMPLETE: &str = "ProcessingComplete";

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

/// Session configuration delivered by the `StartupParams` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupParams {
    /// Directory holding the build tool's internal bookkeeping outputs.
    ///
    /// When set, tasks whose first output lives under this directory are
    /// hidden from the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respire_details_dir: Option<String>,

    /// Any other parameters the producer sent, kept for display.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StartupParams {
    /// Parameters with only the details directory set.
    pub fn with_details_dir(dir: impl Into<String>) -> Self {
        Self {
            respire_details_dir: Some(dir.into()),
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// Payload of a `CreateSystemCommandNode` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNode {
    /// Identity of the new node.
    pub id: NodeId,
    /// Files the task writes. The first one is the node's title.
    pub outputs: Vec<String>,
    /// Files the task reads.
    pub inputs: Vec<String>,
    /// Command line, when the producer included it.
    pub command: Option<String>,
}

/// The typed body of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Replaces the session's startup configuration.
    StartupParams(StartupParams),
    /// Declares a new task node.
    CreateSystemCommandNode(CreateNode),
    /// A node started scanning its dependencies.
    ScanningDependencies {
        /// Node the event refers to.
        id: NodeId,
        /// Whether the producer marked this as a dry run.
        dry_run: bool,
    },
    /// A node started (or, in a dry run, scheduled) its command.
    ExecutingCommand {
        /// Node the event refers to.
        id: NodeId,
        /// Whether the producer marked this as a dry run.
        dry_run: bool,
    },
    /// A node finished processing.
    ProcessingComplete {
        /// Node the event refers to.
        id: NodeId,
        /// Whether the producer marked this as a dry run.
        dry_run: bool,
        /// Error text, present when processing failed.
        error: Option<String>,
    },
    /// A recognised record whose type the graph view does not act on.
    Other {
        /// The record's `type` tag.
        event_type: String,
        /// The record's `id`, if any.
        id: Option<NodeId>,
    },
    /// A record with no usable `type` tag. Kept so the log stays faithful.
    Untyped {
        /// The original record.
        record: serde_json::Value,
    },
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    time_us: Option<u64>,
    kind: EventKind,
}

impl Event {
    /// Build an event from its parts.
    pub const fn new(kind: EventKind, time_us: Option<u64>) -> Self {
        Self { time_us, kind }
    }

    /// Decode a wire record.
    ///
    /// `id` and `time_us` may be JSON strings or integers. A `dry_run` key
    /// marks a dry run regardless of its value, and an `error` key marks a
    /// failure regardless of its value.
    pub fn from_json(record: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = &record else {
            return Self::new(EventKind::Untyped { record }, None);
        };

        let time_us = map.get("time_us").and_then(parse_time_us);
        let Some(event_type) = map.get("type").and_then(serde_json::Value::as_str) else {
            return Self::new(EventKind::Untyped { record }, time_us);
        };
        let id = map.get("id").and_then(NodeId::from_json);
        let dry_run = map.contains_key("dry_run");

        let kind = match (event_type, id) {
            (STARTUP_PARAMS, _) => EventKind::StartupParams(
                map.get("params")
                    .cloned()
                    .and_then(|params| serde_json::from_value(params).ok())
                    .unwrap_or_default(),
            ),
            (CREATE_SYSTEM_COMMAND_NODE, Some(id)) => {
                EventKind::CreateSystemCommandNode(CreateNode {
                    id,
                    outputs: string_list(map.get("outputs")),
                    inputs: string_list(map.get("inputs")),
                    command: map
                        .get("command")
                        .and_then(serde_json::Value::as_str)
                        .map(ToOwned::to_owned),
                })
            }
            (SCANNING_DEPENDENCIES, Some(id)) => EventKind::ScanningDependencies { id, dry_run },
            (EXECUTING_COMMAND, Some(id)) => EventKind::ExecutingCommand { id, dry_run },
            (PROCESSING_COMPLETE, Some(id)) => EventKind::ProcessingComplete {
                id,
                dry_run,
                error: map.get("error").map(error_text),
            },
            (other, id) => EventKind::Other {
                event_type: other.to_owned(),
                id,
            },
        };

        Self::new(kind, time_us)
    }

    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// A `StartupParams` control event (no timestamp).
    pub const fn startup_params(params: StartupParams) -> Self {
        Self::new(EventKind::StartupParams(params), None)
    }

    /// A `CreateSystemCommandNode` event.
    pub fn create_node<O, I>(id: impl Into<NodeId>, outputs: O, inputs: I) -> Self
    where
        O: IntoIterator,
        O::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(
            EventKind::CreateSystemCommandNode(CreateNode {
                id: id.into(),
                outputs: outputs.into_iter().map(Into::into).collect(),
                inputs: inputs.into_iter().map(Into::into).collect(),
                command: None,
            }),
            None,
        )
    }

    /// A `ScanningDependencies` event.
    pub fn scanning(id: impl Into<NodeId>) -> Self {
        Self::new(
            EventKind::ScanningDependencies {
                id: id.into(),
                dry_run: false,
            },
            None,
        )
    }

    /// An `ExecutingCommand` event.
    pub fn executing(id: impl Into<NodeId>) -> Self {
        Self::new(
            EventKind::ExecutingCommand {
                id: id.into(),
                dry_run: false,
            },
            None,
        )
    }

    /// A `ProcessingComplete` event.
    pub fn complete(id: impl Into<NodeId>) -> Self {
        Self::new(
            EventKind::ProcessingComplete {
                id: id.into(),
                dry_run: false,
                error: None,
            },
            None,
        )
    }

    /// Set the event's timestamp in microseconds.
    #[must_use]
    pub const fn at_us(mut self, time_us: u64) -> Self {
        self.time_us = Some(time_us);
        self
    }

    /// Mark a lifecycle event as a dry run. Other kinds are unchanged.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        match &mut self.kind {
            EventKind::ScanningDependencies { dry_run, .. }
            | EventKind::ExecutingCommand { dry_run, .. }
            | EventKind::ProcessingComplete { dry_run, .. } => *dry_run = true,
            _ => {}
        }
        self
    }

    /// Attach an error to a completion event. Other kinds are unchanged.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        if let EventKind::ProcessingComplete { error, .. } = &mut self.kind {
            *error = Some(message.into());
        }
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The typed body.
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Timestamp in microseconds, if the event carries one.
    pub const fn time_us(&self) -> Option<u64> {
        self.time_us
    }

    /// Timestamp in build-time seconds, if the event carries one.
    pub fn time_seconds(&self) -> Option<f64> {
        self.time_us.map(|us| us as f64 / MICROSECONDS_PER_SECOND)
    }

    /// The node id this event correlates to, if any.
    pub const fn node_id(&self) -> Option<&NodeId> {
        match &self.kind {
            EventKind::CreateSystemCommandNode(create) => Some(&create.id),
            EventKind::ScanningDependencies { id, .. }
            | EventKind::ExecutingCommand { id, .. }
            | EventKind::ProcessingComplete { id, .. } => Some(id),
            EventKind::Other { id, .. } => id.as_ref(),
            EventKind::StartupParams(_) | EventKind::Untyped { .. } => None,
        }
    }

    /// The wire `type` tag, or `None` for untyped records.
    pub fn type_name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::StartupParams(_) => Some(STARTUP_PARAMS),
            EventKind::CreateSystemCommandNode(_) => Some(CREATE_SYSTEM_COMMAND_NODE),
            EventKind::ScanningDependencies { .. } => Some(SCANNING_DEPENDENCIES),
            EventKind::ExecutingCommand { .. } => Some(EXECUTING_COMMAND),
            EventKind::ProcessingComplete { .. } => Some(PROCESSING_COMPLETE),
            EventKind::Other { event_type, .. } => Some(event_type),
            EventKind::Untyped { .. } => None,
        }
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn parse_time_us(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn error_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
