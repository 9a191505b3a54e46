//! Error types for the event feed.
//!
//! A feed error never reaches the timeline controller. The poller returns
//! it to its supervisor, which logs it and restarts polling later. The
//! stream is not marked finished.

use std::path::PathBuf;

/// Errors that can occur while fetching or reading events.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The HTTP request failed (connect, timeout, body read).
    #[error("log stream request failed: {source}")]
    Request {
        /// The underlying HTTP client error.
        #[from]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("log stream returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not a JSON array of records.
    #[error("malformed event batch: {reason}")]
    Batch {
        /// What was wrong with the body.
        reason: String,
    },

    /// An activity log file could not be read.
    #[error("failed to read activity log {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A line of an activity log file is not valid JSON.
    #[error("activity log line {line} is not valid JSON: {source}")]
    LogLine {
        /// One-based line number.
        line: usize,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}
