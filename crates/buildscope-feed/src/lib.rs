//! Event feed adapters for the buildscope replay engine.
//!
//! The replay engine consumes batches of events and an end-of-stream
//! marker; this crate produces them from the two places a build's activity
//! log can come from.
//!
//! # Modules
//!
//! - [`batch`] -- Decoding of `/log_stream` bodies and sentinel stripping
//! - [`client`] -- [`LogStreamClient`], the `reqwest` long-poll client
//! - [`log_file`] -- Reader for recorded newline-delimited activity logs
//! - [`poller`] -- The cancellable polling task and its retrying supervisor
//! - [`error`] -- [`FeedError`]

pub mod batch;
pub mod client;
pub mod error;
pub mod log_file;
pub mod poller;

pub use batch::{FeedBatch, QUIT_KEY};
pub use client::LogStreamClient;
pub use error::FeedError;
pub use poller::{BatchSender, FeedSource, PollOutcome, run_feed};
