//! The cancellable polling task that feeds a timeline controller.
//!
//! Batches are delivered on an `mpsc` channel as `Some(events)`; the end of
//! the stream is delivered as `None`, after the last events. A transport
//! failure ends the current polling attempt with an error and delivers
//! nothing, so the stream is never marked finished by mistake.
//! [`run_feed`] is the supervisor that restarts polling after a delay.

use std::path::PathBuf;
use std::time::Duration;

use buildscope_types::Event;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::batch::FeedBatch;
use crate::client::LogStreamClient;
use crate::error::FeedError;
use crate::log_file::read_activity_log;

/// Channel half that carries feed output to the frame driver.
pub type BatchSender = mpsc::Sender<Option<Vec<Event>>>;

/// How a polling attempt ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The stream ended and `None` was delivered.
    Finished,
    /// The shutdown signal fired first.
    Cancelled,
    /// The receiving side went away.
    ReceiverClosed,
}

/// Where events come from.
#[derive(Debug, Clone)]
pub enum FeedSource {
    /// Long-poll a `/log_stream` endpoint.
    LogStream(LogStreamClient),
    /// Replay a recorded activity log as one batch.
    LogFile(PathBuf),
}

/// Forward one batch. Returns the outcome when polling should stop.
async fn deliver(batches: &BatchSender, batch: FeedBatch) -> Option<PollOutcome> {
    if !batch.events.is_empty() && batches.send(Some(batch.events)).await.is_err() {
        return Some(PollOutcome::ReceiverClosed);
    }
    if batch.finished {
        if batches.send(None).await.is_err() {
            return Some(PollOutcome::ReceiverClosed);
        }
        return Some(PollOutcome::Finished);
    }
    None
}

/// Poll `client` until the stream finishes, shutdown fires, or a request
/// fails.
///
/// An in-flight request is abandoned when shutdown fires.
///
/// # Errors
///
/// Returns the [`FeedError`] of the first failed request. Nothing is
/// delivered for that request.
pub async fn poll_log_stream(
    client: &LogStreamClient,
    batches: &BatchSender,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<PollOutcome, FeedError> {
    loop {
        if *shutdown.borrow() {
            return Ok(PollOutcome::Cancelled);
        }

        let batch = tokio::select! {
            _ = shutdown.changed() => return Ok(PollOutcome::Cancelled),
            result = client.fetch_batch() => result?,
        };

        if let Some(outcome) = deliver(batches, batch).await {
            return Ok(outcome);
        }
    }
}

/// Deliver a recorded activity log as one batch followed by end-of-stream.
///
/// # Errors
///
/// Returns [`FeedError::Io`] or [`FeedError::LogLine`] if the file cannot
/// be read or parsed. Nothing is delivered in that case.
pub async fn replay_log_file(
    path: &std::path::Path,
    batches: &BatchSender,
) -> Result<PollOutcome, FeedError> {
    let events = read_activity_log(path).await?;
    let batch = FeedBatch {
        events,
        finished: true,
    };
    Ok(deliver(batches, batch)
        .await
        .unwrap_or(PollOutcome::Finished))
}

/// Run `source` until it finishes or shutdown fires, restarting polling
/// after `retry_delay` whenever a request fails.
///
/// # Errors
///
/// Returns the [`FeedError`] of a log file that cannot be read. HTTP
/// failures are logged and retried, never returned.
pub async fn run_feed(
    source: FeedSource,
    batches: BatchSender,
    mut shutdown: watch::Receiver<bool>,
    retry_delay: Duration,
) -> Result<PollOutcome, FeedError> {
    let client = match source {
        FeedSource::LogFile(path) => {
            let outcome = replay_log_file(&path, &batches).await?;
            info!(path = %path.display(), ?outcome, "Activity log replayed");
            return Ok(outcome);
        }
        FeedSource::LogStream(client) => client,
    };

    info!(url = client.url(), "Polling log stream");
    let mut attempt: u64 = 0;
    loop {
        match poll_log_stream(&client, &batches, &mut shutdown).await {
            Ok(outcome) => {
                info!(url = client.url(), ?outcome, "Log stream polling stopped");
                return Ok(outcome);
            }
            Err(err) => {
                attempt = attempt.saturating_add(1);
                warn!(
                    url = client.url(),
                    error = %err,
                    attempt,
                    retry_in_ms = u64::try_from(retry_delay.as_millis()).unwrap_or(u64::MAX),
                    "Log stream poll failed, retrying"
                );
                tokio::select! {
                    _ = shutdown.changed() => return Ok(PollOutcome::Cancelled),
                    () = tokio::time::sleep(retry_delay) => {}
                }
            }
        }
    }
}
