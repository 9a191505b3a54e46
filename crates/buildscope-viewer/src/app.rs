//! Viewer wiring: event feed, timeline controller, frame driver and
//! observer server.
//!
//! [`run`] owns the controller for the whole session. The feed runs on
//! its own task and hands batches to the frame driver over a channel; the
//! observer runs on another and sends commands back the same way. All
//! three stop when the shared shutdown signal turns `true`.

use std::sync::Arc;
use std::time::Duration;

use buildscope_core::bridge::LoggingRenderer;
use buildscope_core::clock::SystemClock;
use buildscope_core::config::ViewerConfig;
use buildscope_core::runner::{DriverInputs, DriverSummary, log_driver_end, run_timeline};
use buildscope_core::timeline::TimelineController;
use buildscope_feed::{BatchSender, FeedError, FeedSource, LogStreamClient, PollOutcome, run_feed};
use buildscope_observer::{AppState, ObserverBridge, spawn_observer};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::error::ViewerError;

/// Feed batches buffered between the poller and the frame driver.
const BATCH_CHANNEL_CAPACITY: usize = 64;

/// Control commands buffered between the observer and the frame driver.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// How long to wait for open observer connections after shutdown.
const OBSERVER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Pick the event source: a log file if configured, otherwise a
/// `/log_stream` URL.
fn feed_source(config: &ViewerConfig) -> Result<FeedSource, ViewerError> {
    if let Some(path) = &config.feed.log_file {
        return Ok(FeedSource::LogFile(path.clone()));
    }
    let url = config.feed_url().ok_or(ViewerError::NoFeedSource)?;
    let client = LogStreamClient::new(&url, config.feed.request_timeout())?;
    Ok(FeedSource::LogStream(client))
}

/// Run the feed and trigger shutdown if it fails for good.
async fn supervise_feed(
    source: FeedSource,
    batches: BatchSender,
    shutdown: Arc<watch::Sender<bool>>,
    retry_delay: Duration,
) -> Result<PollOutcome, FeedError> {
    let result = run_feed(source, batches, shutdown.subscribe(), retry_delay).await;
    if let Err(e) = &result {
        error!(error = %e, "Event feed failed, shutting down");
        shutdown.send_replace(true);
    }
    result
}

/// Run one viewer session until shutdown, or until the feed is exhausted
/// and nothing can send commands any more.
///
/// With the observer disabled there is no command source, so a finished
/// replay ends the session.
///
/// # Errors
///
/// Returns [`ViewerError`] if the observer cannot bind, no event source is
/// configured, the activity log cannot be read, or a background task
/// panics.
pub async fn run(
    mut config: ViewerConfig,
    shutdown: Arc<watch::Sender<bool>>,
) -> Result<DriverSummary, ViewerError> {
    let (batch_tx, batch_rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

    let mut timeline = TimelineController::new(Arc::new(SystemClock::new()));
    timeline.register_mutation_observer(LoggingRenderer::new());
    timeline.register_graph_sink(LoggingRenderer::new());

    let observer = if config.observer.enabled {
        let state = Arc::new(
            AppState::new(config.producer.respire_details_dir.as_deref()).with_commands(command_tx),
        );
        ObserverBridge::attach(&mut timeline, &state);
        let handle = spawn_observer(&config.observer, state, shutdown.subscribe()).await?;
        config.observer.port = handle.addr.port();
        Some(handle)
    } else {
        drop(command_tx);
        None
    };

    let source = match feed_source(&config) {
        Ok(source) => source,
        Err(e) => {
            shutdown.send_replace(true);
            return Err(e);
        }
    };
    match &source {
        FeedSource::LogFile(path) => info!(path = %path.display(), "Replaying activity log"),
        FeedSource::LogStream(client) => info!(url = client.url(), "Tailing log stream"),
    }
    let feed = tokio::spawn(supervise_feed(
        source,
        batch_tx,
        Arc::clone(&shutdown),
        config.feed.retry_delay(),
    ));

    let inputs = DriverInputs {
        batches: batch_rx,
        commands: command_rx,
        shutdown: shutdown.subscribe(),
    };
    let summary = run_timeline(&mut timeline, inputs, config.playback.frame_interval()).await;
    log_driver_end(&summary);

    shutdown.send_replace(true);
    let feed_result = feed.await?;
    if let Some(observer) = observer {
        let mut task = observer.task;
        if tokio::time::timeout(OBSERVER_DRAIN_TIMEOUT, &mut task)
            .await
            .is_err()
        {
            warn!("Observer connections still open after shutdown, aborting");
            task.abort();
        }
    }

    let outcome = feed_result?;
    info!(?outcome, "Event feed stopped");
    Ok(summary)
}
