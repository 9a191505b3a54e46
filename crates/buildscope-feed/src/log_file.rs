//! Reader for recorded activity logs.
//!
//! The build tool writes one JSON record per line, usually followed by a
//! comma so the file can be wrapped into an array by hand. Blank lines are
//! skipped and a single trailing comma per line is tolerated.

use std::path::Path;

use buildscope_types::Event;
use tracing::info;

use crate::error::FeedError;

/// Parse activity log text into events.
///
/// # Errors
///
/// Returns [`FeedError::LogLine`] for the first line that is not valid JSON.
pub fn parse_activity_log(text: &str) -> Result<Vec<Event>, FeedError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = line.strip_suffix(',').unwrap_or(line);
        let value = serde_json::from_str(record).map_err(|source| FeedError::LogLine {
            line: index.saturating_add(1),
            source,
        })?;
        events.push(Event::from_json(value));
    }
    Ok(events)
}

/// Read and parse an activity log file.
///
/// # Errors
///
/// Returns [`FeedError::Io`] if the file cannot be read, or
/// [`FeedError::LogLine`] if a line is not valid JSON.
pub async fn read_activity_log(path: &Path) -> Result<Vec<Event>, FeedError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let events = parse_activity_log(&text)?;
    info!(path = %path.display(), events = events.len(), "Read activity log");
    Ok(events)
}
