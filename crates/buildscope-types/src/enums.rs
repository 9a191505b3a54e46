//! Enumeration types shared by the replay engine and its front ends.
//!
//! Both enums serialize as kebab-case strings (`"completed-uptodate"`,
//! `"playing-at-end"`) so a browser renderer can use them directly as CSS
//! class names.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Node lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a task node.
///
/// Nodes start [`Inactive`](Self::Inactive), move through scanning, pending
/// or executing, and end in one of the three `Completed*` terminals. The
/// reducer's transition table is authoritative over this ordering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum NodeState {
    /// Declared but not yet touched by the build.
    #[default]
    Inactive,
    /// A dry run decided the node's command will need to run.
    ActionPending,
    /// The node's dependencies are being scanned.
    ScanningDependencies,
    /// The node's command is running.
    Executing,
    /// Completed without running anything (outputs were current).
    #[serde(rename = "completed-uptodate")]
    CompletedUpToDate,
    /// Completed after running its command successfully.
    CompletedSuccess,
    /// Completed with an error.
    CompletedError,
}

impl NodeState {
    /// Every state, in legend order.
    pub const ALL: [Self; 7] = [
        Self::Inactive,
        Self::ActionPending,
        Self::ScanningDependencies,
        Self::Executing,
        Self::CompletedUpToDate,
        Self::CompletedSuccess,
        Self::CompletedError,
    ];

    /// Kebab-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::ActionPending => "action-pending",
            Self::ScanningDependencies => "scanning-dependencies",
            Self::Executing => "executing",
            Self::CompletedUpToDate => "completed-uptodate",
            Self::CompletedSuccess => "completed-success",
            Self::CompletedError => "completed-error",
        }
    }

    /// Human-readable label, e.g. `"Completed Uptodate"`.
    pub fn label(self) -> String {
        self.as_str()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect::<String>()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the node's command has been scheduled or is running.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::ActionPending | Self::Executing)
    }

    /// Whether the node reached one of the completed terminals.
    pub const fn is_completed(self) -> bool {
        matches!(
            self,
            Self::CompletedUpToDate | Self::CompletedSuccess | Self::CompletedError
        )
    }
}

impl core::fmt::Display for NodeState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// Playback mode of the timeline controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum PlaybackMode {
    /// The cursor is frozen.
    Paused,
    /// The cursor advances with wall-clock time from its last anchor.
    Playing,
    /// Live tail: the cursor tracks the newest received event time.
    PlayingAtEnd,
}

impl PlaybackMode {
    /// Kebab-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paused => "paused",
            Self::Playing => "playing",
            Self::PlayingAtEnd => "playing-at-end",
        }
    }
}

impl core::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn node_state_serializes_to_css_class_names() {
        for state in NodeState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
    }

    #[test]
    fn node_state_labels_are_title_cased() {
        assert_eq!(NodeState::CompletedUpToDate.label(), "Completed Uptodate");
        assert_eq!(NodeState::Inactive.label(), "Inactive");
        assert_eq!(
            NodeState::ScanningDependencies.label(),
            "Scanning Dependencies"
        );
    }

    #[test]
    fn running_and_completed_are_disjoint() {
        for state in NodeState::ALL {
            assert!(!(state.is_running() && state.is_completed()));
        }
        assert!(NodeState::ActionPending.is_running());
        assert!(NodeState::CompletedError.is_completed());
    }

    #[test]
    fn playback_mode_round_trips_through_kebab_case() {
        let mode: PlaybackMode = serde_json::from_str("\"playing-at-end\"").unwrap();
        assert_eq!(mode, PlaybackMode::PlayingAtEnd);
        assert_eq!(mode.to_string(), "playing-at-end");
    }
}
