//! Error types for the viewer binary.
//!
//! [`ViewerError`] is the top-level error type that wraps all possible
//! failure modes during startup and playback.

/// Top-level error for the viewer binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: buildscope_core::config::ConfigError,
    },

    /// The event feed could not be set up or a log file could not be read.
    #[error("feed error: {source}")]
    Feed {
        /// The underlying feed error.
        #[from]
        source: buildscope_feed::FeedError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: buildscope_observer::ServerError,
    },

    /// A background task panicked or was cancelled.
    #[error("task error: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// Neither a log file, a feed URL, nor the observer's own queue is
    /// available to read events from.
    #[error("no event source: set feed.log_file, feed.url, or enable the observer")]
    NoFeedSource,
}
