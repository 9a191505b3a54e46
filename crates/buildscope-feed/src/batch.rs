//! Decoding of `/log_stream` response bodies.
//!
//! Each response is a JSON array of event records. The final response of a
//! stream ends with a sentinel record carrying a `quit_key` field; it is
//! not an event and is stripped here.

use buildscope_types::Event;

use crate::error::FeedError;

/// Key that identifies the end-of-stream sentinel record.
pub const QUIT_KEY: &str = "quit_key";

/// One decoded response from the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedBatch {
    /// Events in arrival order, sentinel removed.
    pub events: Vec<Event>,
    /// Whether the response ended with the sentinel.
    pub finished: bool,
}

impl FeedBatch {
    /// The end-of-stream marker with no events.
    pub const fn finished() -> Self {
        Self {
            events: Vec::new(),
            finished: true,
        }
    }
}

/// Whether `record` is the end-of-stream sentinel.
pub fn is_sentinel(record: &serde_json::Value) -> bool {
    record
        .as_object()
        .is_some_and(|map| map.contains_key(QUIT_KEY))
}

/// Decode a response body that was already parsed as JSON.
///
/// Only the final element is checked for the sentinel.
///
/// # Errors
///
/// Returns [`FeedError::Batch`] if `body` is not an array.
pub fn decode_batch(body: serde_json::Value) -> Result<FeedBatch, FeedError> {
    let serde_json::Value::Array(mut records) = body else {
        return Err(FeedError::Batch {
            reason: format!("expected a JSON array, got {}", json_kind(&body)),
        });
    };

    let finished = records.last().is_some_and(is_sentinel);
    if finished {
        records.pop();
    }

    Ok(FeedBatch {
        events: records.into_iter().map(Event::from_json).collect(),
        finished,
    })
}

/// Decode a raw response body.
///
/// # Errors
///
/// Returns [`FeedError::Batch`] if `body` is not a JSON array.
pub fn decode_batch_str(body: &str) -> Result<FeedBatch, FeedError> {
    let value = serde_json::from_str(body).map_err(|err| FeedError::Batch {
        reason: err.to_string(),
    })?;
    decode_batch(value)
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
