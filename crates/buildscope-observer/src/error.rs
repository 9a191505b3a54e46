//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The request body was well-formed JSON of the wrong shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The producer was told to finish and accepts no more events.
    #[error("the event stream is finishing and accepts no more events")]
    StreamClosed,

    /// The final batch, sentinel included, was already delivered.
    #[error("the event stream already delivered its final batch")]
    StreamDone,

    /// No timeline is attached, or the task that owns it has stopped.
    #[error("playback control unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::StreamClosed => StatusCode::CONFLICT,
            Self::StreamDone => StatusCode::GONE,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
