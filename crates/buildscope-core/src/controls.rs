//! Inbound control surface: the operations behind the playback buttons.
//!
//! Each operation maps one user gesture onto the controller's primitive
//! mode and cursor operations. The gestures that pick a specific point in
//! time (go to start, step, finite seek) pause first so the chosen frame
//! stays on screen.
//!
//! [`ControlCommand`] is the serializable form of the same gestures, used
//! to carry them from the HTTP API to the task that owns the controller.

use buildscope_types::PlaybackMode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::timeline::TimelineController;

/// A playback gesture received from a front end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Pause and rewind to build time zero.
    GoToStart,
    /// Pause and step to the previous visible event.
    StepBack,
    /// Freeze the cursor.
    Pause,
    /// Advance the cursor with wall-clock time.
    Play,
    /// Pause and step to the next visible event.
    StepForward,
    /// Tail the live end of the stream.
    PlayFromLiveEnd,
    /// Jump to a fraction of the end time.
    SeekToFraction {
        /// Position on the timeline, `0.0` to `1.0`.
        progress: f64,
    },
}

impl TimelineController {
    /// Pause and rewind to build time zero.
    pub fn go_to_start(&mut self) {
        self.set_state(PlaybackMode::Paused);
        self.set_current_build_time(0.0);
    }

    /// Pause and step to the previous visible event.
    pub fn step_back(&mut self) {
        self.set_state(PlaybackMode::Paused);
        self.step_back_event();
    }

    /// Freeze the cursor where it is.
    pub fn pause(&mut self) {
        self.set_state(PlaybackMode::Paused);
    }

    /// Play forward from the cursor.
    pub fn play(&mut self) {
        self.set_state(PlaybackMode::Playing);
    }

    /// Pause and step to the next visible event.
    pub fn step_forward(&mut self) {
        self.set_state(PlaybackMode::Paused);
        self.step_forward_event();
    }

    /// Tail the live end of the stream, or jump to the end of a finished one.
    pub fn play_from_live_end(&mut self) {
        self.set_state(PlaybackMode::PlayingAtEnd);
    }

    /// Seek to `progress × end_time`.
    ///
    /// A progress of one resumes live tracking instead of seeking. Values
    /// outside `[0, 1]` are clamped and NaN is treated as zero.
    pub fn seek_to_fraction(&mut self, progress: f64) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            self.play_from_live_end();
        } else {
            self.set_state(PlaybackMode::Paused);
            self.set_current_build_time(self.end_time() * progress);
        }
    }

    /// Dispatch a [`ControlCommand`].
    pub fn apply_command(&mut self, command: ControlCommand) {
        debug!(?command, "Applying control command");
        match command {
            ControlCommand::GoToStart => self.go_to_start(),
            ControlCommand::StepBack => self.step_back(),
            ControlCommand::Pause => self.pause(),
            ControlCommand::Play => self.play(),
            ControlCommand::StepForward => self.step_forward(),
            ControlCommand::PlayFromLiveEnd => self.play_from_live_end(),
            ControlCommand::SeekToFraction { progress } => self.seek_to_fraction(progress),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::sync::Arc;

    use buildscope_types::Event;

    use super::*;
    use crate::clock::ManualClock;

    fn live_timeline() -> (TimelineController, ManualClock) {
        let clock = ManualClock::new();
        let mut timeline = TimelineController::new(Arc::new(clock.clone()));
        timeline.process_new_events(Some(vec![
            Event::create_node(1_u64, ["a"], Vec::<String>::new()).at_us(1_000_000),
            Event::executing(1_u64).at_us(2_000_000),
            Event::complete(1_u64).at_us(4_000_000),
        ]));
        (timeline, clock)
    }

    #[test]
    fn go_to_start_pauses_at_zero() {
        let (mut timeline, clock) = live_timeline();
        clock.advance_secs(1);
        timeline.refresh();
        assert_eq!(timeline.events_played(), 3);

        timeline.go_to_start();
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 0.0);
        assert_eq!(timeline.events_played(), 0);
    }

    #[test]
    fn stepping_pauses_first() {
        let (mut timeline, _clock) = live_timeline();
        timeline.go_to_start();
        timeline.play();
        assert_eq!(timeline.mode(), PlaybackMode::Playing);

        timeline.step_forward();
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 1.0);

        timeline.step_forward();
        timeline.play();
        timeline.step_back();
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 1.0);
    }

    #[test]
    fn seek_to_fraction_scales_end_time() {
        let (mut timeline, _clock) = live_timeline();
        timeline.seek_to_fraction(0.5);
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 2.0);
        assert_eq!(timeline.events_played(), 2);
    }

    #[test]
    fn seek_to_fraction_one_resumes_live_tracking() {
        let (mut timeline, _clock) = live_timeline();
        timeline.pause();
        timeline.seek_to_fraction(1.0);
        assert_eq!(timeline.mode(), PlaybackMode::PlayingAtEnd);

        timeline.pause();
        timeline.seek_to_fraction(7.5);
        assert_eq!(timeline.mode(), PlaybackMode::PlayingAtEnd);
    }

    #[test]
    fn seek_to_fraction_clamps_bad_input() {
        let (mut timeline, _clock) = live_timeline();
        timeline.seek_to_fraction(-3.0);
        assert_eq!(timeline.current_time(), 0.0);
        timeline.seek_to_fraction(f64::NAN);
        assert_eq!(timeline.current_time(), 0.0);
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
    }

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let command: ControlCommand =
            serde_json::from_str(r#"{"command":"seek_to_fraction","progress":0.25}"#).unwrap();
        assert_eq!(command, ControlCommand::SeekToFraction { progress: 0.25 });

        let command: ControlCommand =
            serde_json::from_str(r#"{"command":"play_from_live_end"}"#).unwrap();
        assert_eq!(command, ControlCommand::PlayFromLiveEnd);
    }

    #[test]
    fn apply_command_dispatches() {
        let (mut timeline, _clock) = live_timeline();
        timeline.apply_command(ControlCommand::SeekToFraction { progress: 0.25 });
        assert_eq!(timeline.current_time(), 1.0);
        timeline.apply_command(ControlCommand::Play);
        assert_eq!(timeline.mode(), PlaybackMode::Playing);
        timeline.apply_command(ControlCommand::Pause);
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
    }
}
