//! Frame driver: the single task that owns a [`TimelineController`].
//!
//! [`run_timeline`] multiplexes three inputs onto the controller:
//!
//! - **Event batches** from the feed (`Some(batch)`, or `None` for
//!   end-of-stream)
//! - **Control commands** from front ends
//! - **Frame ticks** from a [`tokio::time::Interval`], which call
//!   [`TimelineController::refresh`] only when the controller requested a
//!   frame
//!
//! Everything runs on one task, so the controller needs no lock. The loop
//! ends on a shutdown signal, or once both input channels are closed and
//! no frame is pending (nothing could change any more).

use std::time::Duration;

use buildscope_types::{Event, PlaybackStatus};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::controls::ControlCommand;
use crate::timeline::TimelineController;

/// Reason the frame driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEndReason {
    /// The shutdown signal fired (or its sender was dropped).
    Shutdown,
    /// Feed and command channels are closed and playback is idle.
    InputsClosed,
}

/// What the frame driver did before stopping.
#[derive(Debug, Clone)]
pub struct DriverSummary {
    /// Why the loop ended.
    pub end_reason: DriverEndReason,
    /// Number of frames rendered.
    pub frames: u64,
    /// Number of feed messages handled (batches and end-of-stream).
    pub batches: u64,
    /// Number of control commands applied.
    pub commands: u64,
    /// Playback status at the time the loop ended.
    pub status: PlaybackStatus,
}

/// Input channels of the frame driver.
#[derive(Debug)]
pub struct DriverInputs {
    /// Batches from the feed; `None` marks end-of-stream.
    pub batches: mpsc::Receiver<Option<Vec<Event>>>,
    /// Gestures from front ends.
    pub commands: mpsc::Receiver<ControlCommand>,
    /// Fires `true` to stop the loop.
    pub shutdown: watch::Receiver<bool>,
}

/// Drive `timeline` until shutdown or until its inputs are exhausted.
///
/// # Arguments
///
/// * `timeline` - The controller to drive; observers and sinks should
///   already be registered
/// * `inputs` - Feed, command and shutdown channels
/// * `frame_interval` - Time between frame ticks while playing
pub async fn run_timeline(
    timeline: &mut TimelineController,
    inputs: DriverInputs,
    frame_interval: Duration,
) -> DriverSummary {
    let DriverInputs {
        mut batches,
        mut commands,
        mut shutdown,
    } = inputs;

    let mut ticker = tokio::time::interval(frame_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut batches_open = true;
    let mut commands_open = true;
    let mut frames: u64 = 0;
    let mut batch_count: u64 = 0;
    let mut command_count: u64 = 0;

    info!(
        frame_interval_ms = u64::try_from(frame_interval.as_millis()).unwrap_or(u64::MAX),
        mode = %timeline.mode(),
        "Frame driver starting"
    );

    let end_reason = loop {
        if *shutdown.borrow() {
            break DriverEndReason::Shutdown;
        }
        if !batches_open && !commands_open && !timeline.frame_requested() {
            break DriverEndReason::InputsClosed;
        }

        // Inputs are drained before frames so a frame sees every batch
        // that was already queued.
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() {
                    break DriverEndReason::Shutdown;
                }
            }
            batch = batches.recv(), if batches_open => {
                if let Some(batch) = batch {
                    batch_count = batch_count.saturating_add(1);
                    timeline.process_new_events(batch);
                } else {
                    debug!("Feed channel closed");
                    batches_open = false;
                }
            }
            command = commands.recv(), if commands_open => {
                if let Some(command) = command {
                    command_count = command_count.saturating_add(1);
                    timeline.apply_command(command);
                } else {
                    debug!("Command channel closed");
                    commands_open = false;
                }
            }
            _ = ticker.tick() => {
                if timeline.take_frame_request() {
                    frames = frames.saturating_add(1);
                    timeline.refresh();
                }
            }
        }
    };

    DriverSummary {
        end_reason,
        frames,
        batches: batch_count,
        commands: command_count,
        status: timeline.status(),
    }
}

/// Log the outcome of [`run_timeline`].
pub fn log_driver_end(summary: &DriverSummary) {
    info!(
        reason = ?summary.end_reason,
        frames = summary.frames,
        batches = summary.batches,
        commands = summary.commands,
        mode = %summary.status.mode,
        current_time = summary.status.current_time,
        events_played = summary.status.events_played,
        events_fetched = summary.status.events_fetched,
        stream_finished = summary.status.stream_finished,
        "Frame driver stopped"
    );
}
