//! Shared type definitions for the buildscope task graph viewer.
//!
//! This crate is the single source of truth for the values that flow between
//! the event feed, the replay engine, and presentation front ends. Types that
//! a browser renderer consumes also generate `TypeScript` bindings via
//! `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Node identifier wrapper tolerant of string or integer ids
//! - [`enums`] -- Node lifecycle states and playback modes
//! - [`event`] -- Wire event decoding into a tagged [`EventKind`]
//! - [`structs`] -- Derived nodes, edges, graph snapshots, playback status

pub mod enums;
pub mod event;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{NodeState, PlaybackMode};
pub use event::{CreateNode, Event, EventKind, MICROSECONDS_PER_SECOND, StartupParams};
pub use ids::NodeId;
pub use structs::{Edge, GraphSnapshot, Node, PlaybackStatus, count_states};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the browser front end.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. The files are written to the `bindings/`
        // directory relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::NodeId::export_all();
        let _ = crate::enums::NodeState::export_all();
        let _ = crate::enums::PlaybackMode::export_all();
        let _ = crate::structs::Node::export_all();
        let _ = crate::structs::Edge::export_all();
        let _ = crate::structs::GraphSnapshot::export_all();
        let _ = crate::structs::PlaybackStatus::export_all();
    }
}
