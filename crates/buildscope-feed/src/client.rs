//! HTTP client for a `/log_stream` long-poll endpoint.
//!
//! The server holds each `GET /log_stream` until at least one event is
//! queued, then drains its queue into the response. A client therefore
//! issues one request after another; each response is one batch.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::batch::{FeedBatch, decode_batch};
use crate::error::FeedError;

/// Path of the long-poll endpoint, relative to the base URL.
pub const LOG_STREAM_PATH: &str = "/log_stream";

/// Client for one `/log_stream` endpoint.
#[derive(Debug, Clone)]
pub struct LogStreamClient {
    client: reqwest::Client,
    url: String,
}

impl LogStreamClient {
    /// Create a client for the server at `base_url`.
    ///
    /// `request_timeout` bounds each long-poll request. It should be longer
    /// than the server's own hold time.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: format!("{}{LOG_STREAM_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// The full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one long-poll request and decode the batch it returns.
    ///
    /// A `410 Gone` answer means the server already delivered its final
    /// batch, and is reported as an empty finished batch.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Request`] on transport failure,
    /// [`FeedError::Status`] on any other non-success status, or
    /// [`FeedError::Batch`] if the body is not an array of records.
    pub async fn fetch_batch(&self) -> Result<FeedBatch, FeedError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status == StatusCode::GONE {
            debug!(url = %self.url, "Log stream already finished");
            return Ok(FeedBatch::finished());
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let batch = decode_batch(body)?;
        debug!(
            url = %self.url,
            events = batch.events.len(),
            finished = batch.finished,
            "Fetched event batch"
        );
        Ok(batch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = LogStreamClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://localhost:8000/log_stream");

        let client = LogStreamClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://localhost:8000/log_stream");
    }
}
