//! Event-sourced replay engine for build task graphs.
//!
//! This crate turns an append-only log of build lifecycle events into a
//! point-in-time graph of task nodes and dependency edges, and lets a
//! front end move through that history like a video.
//!
//! # Modules
//!
//! - [`reducer`] -- [`GraphState`], the replayable fold from events to nodes
//!   and edges, including the visibility filter.
//! - [`timeline`] -- [`TimelineController`], the event log plus build-time
//!   cursor with paused, playing and live-tail modes.
//! - [`controls`] -- The button-level control surface and the serializable
//!   [`ControlCommand`].
//! - [`bridge`] -- Observer and graph-sink traits for presentation, and the
//!   [`LoggingRenderer`].
//! - [`clock`] -- Wall-clock abstraction used for playback timing.
//! - [`config`] -- Configuration loading from `buildscope.yaml`.
//! - [`runner`] -- The async frame driver that owns a controller.
//!
//! [`GraphState`]: reducer::GraphState
//! [`TimelineController`]: timeline::TimelineController
//! [`ControlCommand`]: controls::ControlCommand
//! [`LoggingRenderer`]: bridge::LoggingRenderer

pub mod bridge;
pub mod clock;
pub mod config;
pub mod controls;
pub mod reducer;
pub mod runner;
pub mod timeline;
