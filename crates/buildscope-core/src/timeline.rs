//! The timeline controller: an event log with a movable build-time cursor.
//!
//! [`TimelineController`] owns the append-only event log and a
//! [`GraphState`] that is always exactly the fold of the first
//! `events_played()` events. Moving the cursor forward folds the newly
//! crossed events in one batch. Moving it before the most recently applied
//! timestamped event resets the reducer and replays from the start, since
//! events cannot be un-applied.
//!
//! # Modes
//!
//! | Mode | Cursor |
//! |---|---|
//! | `Paused` | frozen at the last anchor |
//! | `Playing` | anchor plus wall-clock time elapsed since anchoring, capped at the end once the stream is finished |
//! | `PlayingAtEnd` | latest event time, extrapolated with wall-clock time until the stream is finished |
//!
//! # Frames
//!
//! The controller does not schedule anything itself. While it is not
//! paused it raises a frame request after each [`refresh`]; a driver polls
//! [`take_frame_request`] and calls [`refresh`] again on its next tick.
//! Pausing clears the request.
//!
//! [`refresh`]: TimelineController::refresh
//! [`take_frame_request`]: TimelineController::take_frame_request

use std::sync::Arc;

use buildscope_types::{Event, PlaybackMode, PlaybackStatus};
use tracing::{debug, info};

use crate::bridge::{GraphUpdateSink, MutationObserver};
use crate::clock::{PlaybackClock, SystemClock};
use crate::reducer::GraphState;

/// Event log, playback cursor and the graph folded up to the cursor.
pub struct TimelineController {
    /// Wall-clock source.
    clock: Arc<dyn PlaybackClock>,

    /// Every event received so far, in arrival order.
    events: Vec<Event>,

    /// Current playback mode.
    mode: PlaybackMode,

    /// Build time (seconds) of the cursor at the last anchor.
    playback_build_time_start: f64,

    /// Wall-clock time (seconds) of the last anchor.
    playback_real_time_start: f64,

    /// Time (seconds) of the newest timestamped event received.
    latest_event_time: f64,

    /// Wall-clock time (seconds) at which `latest_event_time` was received.
    latest_event_real_time_receipt: f64,

    /// Whether the feed signalled end-of-stream.
    event_stream_finished: bool,

    /// Whether the driver should call `refresh` on its next tick.
    frame_requested: bool,

    /// Number of events folded into `graph`.
    next_event_index: usize,

    /// Fold of `events[..next_event_index]`.
    graph: GraphState,

    observers: Vec<Box<dyn MutationObserver>>,
    sinks: Vec<Box<dyn GraphUpdateSink>>,
}

impl std::fmt::Debug for TimelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineController")
            .field("mode", &self.mode)
            .field("events", &self.events.len())
            .field("next_event_index", &self.next_event_index)
            .field("latest_event_time", &self.latest_event_time)
            .field("event_stream_finished", &self.event_stream_finished)
            .field("frame_requested", &self.frame_requested)
            .finish_non_exhaustive()
    }
}

impl Default for TimelineController {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

impl TimelineController {
    /// Create a controller with an empty log, tailing the live end.
    ///
    /// The cursor starts at build time zero and the controller immediately
    /// enters [`PlaybackMode::PlayingAtEnd`], so a frame is requested.
    pub fn new(clock: Arc<dyn PlaybackClock>) -> Self {
        let now = clock.now_seconds();
        let mut controller = Self {
            clock,
            events: Vec::new(),
            mode: PlaybackMode::Paused,
            playback_build_time_start: 0.0,
            playback_real_time_start: now,
            latest_event_time: 0.0,
            latest_event_real_time_receipt: now,
            event_stream_finished: false,
            frame_requested: false,
            next_event_index: 0,
            graph: GraphState::new(),
            observers: Vec::new(),
            sinks: Vec::new(),
        };
        controller.set_current_build_time(0.0);
        controller.reset_current_state();
        controller.set_state(PlaybackMode::PlayingAtEnd);
        controller
    }

    // -----------------------------------------------------------------------
    // Listener registration
    // -----------------------------------------------------------------------

    /// Register a listener notified after every state-affecting operation.
    pub fn register_mutation_observer(&mut self, observer: impl MutationObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Register a listener that receives the graph whenever it advances.
    pub fn register_graph_sink(&mut self, sink: impl GraphUpdateSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    fn signal_mutation(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in &mut observers {
            observer.on_mutation(self);
        }
        self.observers = observers;
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    /// Cursor position in build-time seconds.
    pub fn current_time(&self) -> f64 {
        match self.mode {
            PlaybackMode::Paused => self.playback_build_time_start,
            PlaybackMode::Playing => {
                let playback_time = self.playback_build_time_start
                    + (self.clock.now_seconds() - self.playback_real_time_start);
                if self.event_stream_finished && playback_time >= self.latest_event_time {
                    self.latest_event_time
                } else {
                    playback_time
                }
            }
            PlaybackMode::PlayingAtEnd => {
                if self.event_stream_finished {
                    self.latest_event_time
                } else {
                    self.latest_event_time
                        + (self.clock.now_seconds() - self.latest_event_real_time_receipt)
                }
            }
        }
    }

    /// Move the cursor to `time` and fold events up to it.
    ///
    /// Seeking before the most recently applied timestamped event resets
    /// the graph and replays from the first event.
    pub fn set_current_build_time(&mut self, time: f64) {
        if self
            .most_recent_played_event_time()
            .is_some_and(|recent| time < recent)
        {
            debug!(
                target_time = time,
                events_played = self.next_event_index,
                "Seeking backward, replaying from start"
            );
            self.reset_current_state();
        }

        self.playback_build_time_start = time;
        self.playback_real_time_start = self.clock.now_seconds();

        self.advance_node_state();
        self.signal_mutation();
    }

    fn reset_current_state(&mut self) {
        self.graph.reset();
        self.next_event_index = 0;
    }

    /// Time of the last folded event that carries a timestamp.
    fn most_recent_played_event_time(&self) -> Option<f64> {
        self.events
            .get(..self.next_event_index)
            .unwrap_or_default()
            .iter()
            .rev()
            .find_map(Event::time_seconds)
    }

    /// Fold every event due at the current time.
    ///
    /// Untimestamped events are always due. Folding stops at the first
    /// timestamped event later than the cursor, so the folded prefix stays
    /// contiguous even when timestamps are not monotonic.
    pub fn advance_node_state(&mut self) {
        let previous_event_index = self.next_event_index;
        let current_build_time = self.current_time();

        let crossed = self
            .events
            .get(previous_event_index..)
            .unwrap_or_default()
            .iter()
            .take_while(|event| {
                event
                    .time_seconds()
                    .is_none_or(|time| time <= current_build_time)
            })
            .count();
        if crossed == 0 {
            return;
        }

        self.next_event_index = previous_event_index.saturating_add(crossed);
        let batch = self
            .events
            .get(previous_event_index..self.next_event_index)
            .unwrap_or_default();
        self.graph.apply(batch);

        for sink in &mut self.sinks {
            sink.on_graph_update(self.graph.nodes(), self.graph.edges());
        }
    }

    // -----------------------------------------------------------------------
    // Modes and frames
    // -----------------------------------------------------------------------

    /// Switch playback mode.
    ///
    /// Entering `Paused` or `Playing` first re-anchors the cursor at its
    /// current position so the switch never makes time jump. Entering
    /// `PlayingAtEnd` on a finished stream seeks to the end instead. Every
    /// real transition refreshes and notifies observers.
    pub fn set_state(&mut self, new_mode: PlaybackMode) {
        if new_mode == self.mode {
            return;
        }

        match new_mode {
            PlaybackMode::PlayingAtEnd => {
                if self.event_stream_finished {
                    self.set_current_build_time(self.latest_event_time);
                }
            }
            PlaybackMode::Paused | PlaybackMode::Playing => {
                let now = self.current_time();
                self.set_current_build_time(now);
            }
        }

        info!(from = %self.mode, to = %new_mode, "Playback mode changed");
        self.mode = new_mode;
        if new_mode == PlaybackMode::Paused {
            self.frame_requested = false;
        }

        self.refresh();
        self.signal_mutation();
    }

    /// Run one frame: fold due events, auto-pause at the end of a finished
    /// stream, notify observers, and request the next frame unless paused.
    pub fn refresh(&mut self) {
        self.frame_requested = false;

        self.advance_node_state();

        if self.event_stream_finished {
            let at_end = match self.mode {
                PlaybackMode::PlayingAtEnd => true,
                PlaybackMode::Playing => self.current_time() >= self.end_time(),
                PlaybackMode::Paused => false,
            };
            if at_end {
                self.set_state(PlaybackMode::Paused);
            }
        }

        self.signal_mutation();

        if self.mode != PlaybackMode::Paused {
            self.frame_requested = true;
        }
    }

    /// Whether a frame is pending.
    pub const fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Consume the pending frame request, returning whether there was one.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    /// Accept a batch from the feed, or `None` for end-of-stream.
    ///
    /// The end time and its wall-clock receipt are taken from the batch's
    /// last timestamped event. Observers are always notified.
    pub fn process_new_events(&mut self, batch: Option<Vec<Event>>) {
        if let Some(batch) = batch {
            if let Some(time) = batch.iter().rev().find_map(Event::time_seconds) {
                self.latest_event_time = time;
                self.latest_event_real_time_receipt = self.clock.now_seconds();
            }
            debug!(
                received = batch.len(),
                events_fetched = self.events.len().saturating_add(batch.len()),
                end_time = self.latest_event_time,
                "Events received"
            );
            self.events.extend(batch);
        } else {
            info!(
                events_fetched = self.events.len(),
                end_time = self.latest_event_time,
                "Event stream finished"
            );
            self.event_stream_finished = true;
        }

        self.signal_mutation();
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Seek to the next visible timestamped event after the folded prefix.
    ///
    /// The target is the largest timestamp crossed on the way, so the
    /// cursor never moves backward. When only hidden timestamped events
    /// remain, seeks past all of them so the tail is folded. Does nothing
    /// when no timestamped event is left.
    pub fn step_forward_event(&mut self) {
        let mut latest_time = self.most_recent_played_event_time().unwrap_or(0.0);
        let mut crossed_any = false;
        for event in self.events.get(self.next_event_index..).unwrap_or_default() {
            let Some(time) = event.time_seconds() else {
                continue;
            };
            latest_time = latest_time.max(time);
            crossed_any = true;
            if !self.graph.should_ignore(event) {
                break;
            }
        }

        if crossed_any {
            self.set_current_build_time(latest_time);
        }
    }

    /// Seek to the latest folded visible event earlier than the cursor, or
    /// to zero if there is none.
    pub fn step_back_event(&mut self) {
        let current_time = self.current_time();
        let target = self
            .events
            .get(..self.next_event_index)
            .unwrap_or_default()
            .iter()
            .rev()
            .filter(|event| !self.graph.should_ignore(event))
            .find_map(|event| event.time_seconds().filter(|&time| time < current_time));

        self.set_current_build_time(target.unwrap_or(0.0));
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current playback mode.
    pub const fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Time of the newest timestamped event received, in seconds.
    pub const fn end_time(&self) -> f64 {
        self.latest_event_time
    }

    /// Number of events folded into the graph.
    pub const fn events_played(&self) -> usize {
        self.next_event_index
    }

    /// Number of events received from the feed.
    pub fn events_fetched(&self) -> usize {
        self.events.len()
    }

    /// Whether the feed signalled end-of-stream.
    pub const fn stream_finished(&self) -> bool {
        self.event_stream_finished
    }

    /// The graph folded up to the cursor.
    pub const fn graph(&self) -> &GraphState {
        &self.graph
    }

    /// Snapshot of everything a timeline widget displays.
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            mode: self.mode,
            current_time: self.current_time(),
            end_time: self.end_time(),
            events_played: self.events_played(),
            events_fetched: self.events_fetched(),
            stream_finished: self.event_stream_finished,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use buildscope_types::{Edge, Node, NodeId, NodeState, StartupParams};

    use super::*;

    const SECOND: u64 = 1_000_000;

    fn controller() -> (TimelineController, crate::clock::ManualClock) {
        let clock = crate::clock::ManualClock::new();
        let timeline = TimelineController::new(Arc::new(clock.clone()));
        (timeline, clock)
    }

    fn create(id: u64, output: &str, inputs: &[&str], at: u64) -> Event {
        Event::create_node(id, [output], inputs.iter().copied()).at_us(at)
    }

    /// A small build: two visible tasks, one hidden bookkeeping task.
    fn build_log() -> Vec<Event> {
        vec![
            Event::startup_params(StartupParams::with_details_dir("/out/.d")),
            create(1, "gen/a.h", &[], SECOND),
            create(2, "/out/.d/deps", &[], 2 * SECOND),
            create(3, "obj/b.o", &["gen/a.h"], 3 * SECOND),
            Event::scanning(1_u64).at_us(4 * SECOND),
            Event::executing(2_u64).at_us(5 * SECOND),
            Event::executing(1_u64).at_us(6 * SECOND),
            Event::complete(1_u64).at_us(7 * SECOND),
            Event::executing(3_u64).at_us(8 * SECOND),
            Event::complete(3_u64).with_error("exit 1").at_us(9 * SECOND),
        ]
    }

    fn paused_with(events: Vec<Event>) -> (TimelineController, crate::clock::ManualClock) {
        let (mut timeline, clock) = controller();
        timeline.set_state(PlaybackMode::Paused);
        timeline.process_new_events(Some(events));
        timeline.set_current_build_time(0.0);
        (timeline, clock)
    }

    // -----------------------------------------------------------------------
    // Start-up and live tail
    // -----------------------------------------------------------------------

    #[test]
    fn starts_tailing_the_live_end() {
        let (timeline, _clock) = controller();
        assert_eq!(timeline.mode(), PlaybackMode::PlayingAtEnd);
        assert!(timeline.frame_requested());
        assert_eq!(timeline.current_time(), 0.0);
        assert_eq!(timeline.events_played(), 0);
        assert!(!timeline.stream_finished());
    }

    #[test]
    fn live_tail_extrapolates_from_last_receipt() {
        let (mut timeline, clock) = controller();
        clock.advance_secs(10);
        timeline.process_new_events(Some(vec![
            create(1, "a", &[], SECOND),
            create(2, "b", &[], 2 * SECOND),
        ]));
        assert_eq!(timeline.end_time(), 2.0);
        assert_eq!(timeline.current_time(), 2.0);

        clock.advance(std::time::Duration::from_millis(500));
        assert_eq!(timeline.current_time(), 2.5);

        assert!(timeline.take_frame_request());
        timeline.refresh();
        assert_eq!(timeline.events_played(), 2);
        assert!(timeline.frame_requested());
    }

    #[test]
    fn end_time_comes_from_last_timestamped_event() {
        let (mut timeline, _clock) = controller();
        timeline.process_new_events(Some(vec![
            create(1, "a", &[], 3 * SECOND),
            Event::startup_params(StartupParams::default()),
        ]));
        assert_eq!(timeline.end_time(), 3.0);

        timeline.process_new_events(Some(vec![Event::startup_params(
            StartupParams::default(),
        )]));
        assert_eq!(timeline.end_time(), 3.0);
        assert_eq!(timeline.events_fetched(), 3);
    }

    #[test]
    fn end_of_stream_pauses_live_tail_at_end() {
        let (mut timeline, clock) = controller();
        timeline.process_new_events(Some(build_log()));
        clock.advance_secs(30);
        timeline.process_new_events(None);
        assert!(timeline.stream_finished());
        assert_eq!(timeline.mode(), PlaybackMode::PlayingAtEnd);

        timeline.refresh();
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 9.0);
        assert_eq!(timeline.events_played(), timeline.events_fetched());
        assert!(!timeline.frame_requested());
    }

    #[test]
    fn playing_at_end_of_finished_stream_jumps_to_end() {
        let (mut timeline, _clock) = paused_with(build_log());
        timeline.process_new_events(None);

        timeline.set_state(PlaybackMode::PlayingAtEnd);
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 9.0);
        assert_eq!(timeline.events_played(), 10);
    }

    // -----------------------------------------------------------------------
    // Pause and play
    // -----------------------------------------------------------------------

    #[test]
    fn pause_freezes_the_cursor_and_cancels_frames() {
        let (mut timeline, clock) = controller();
        timeline.process_new_events(Some(build_log()));
        clock.advance_secs(1);
        timeline.set_state(PlaybackMode::Paused);
        assert!(!timeline.frame_requested());

        let frozen = timeline.current_time();
        assert_eq!(frozen, 10.0);
        clock.advance_secs(5);
        assert_eq!(timeline.current_time(), frozen);
        assert!(!timeline.take_frame_request());
    }

    #[test]
    fn playing_advances_with_the_wall_clock() {
        let (mut timeline, clock) = paused_with(build_log());
        timeline.set_current_build_time(2.0);
        timeline.set_state(PlaybackMode::Playing);
        assert_eq!(timeline.current_time(), 2.0);
        assert!(timeline.frame_requested());

        clock.advance_secs(3);
        assert_eq!(timeline.current_time(), 5.0);
        timeline.refresh();
        assert_eq!(timeline.events_played(), 6);
        assert_eq!(timeline.mode(), PlaybackMode::Playing);
    }

    #[test]
    fn playing_a_finished_stream_stops_at_the_end() {
        let (mut timeline, clock) = paused_with(build_log());
        timeline.process_new_events(None);
        timeline.set_current_build_time(8.0);
        timeline.set_state(PlaybackMode::Playing);

        clock.advance_secs(20);
        assert_eq!(timeline.current_time(), 9.0);
        timeline.refresh();
        assert_eq!(timeline.mode(), PlaybackMode::Paused);
        assert_eq!(timeline.current_time(), 9.0);
        assert_eq!(timeline.events_played(), 10);
    }

    #[test]
    fn playing_an_open_stream_runs_past_the_end() {
        let (mut timeline, clock) = paused_with(build_log());
        timeline.set_current_build_time(8.0);
        timeline.set_state(PlaybackMode::Playing);
        clock.advance_secs(20);
        assert_eq!(timeline.current_time(), 28.0);
        timeline.refresh();
        assert_eq!(timeline.mode(), PlaybackMode::Playing);
    }

    #[test]
    fn same_mode_is_a_no_op() {
        let (mut timeline, _clock) = paused_with(Vec::new());
        let calls = Arc::new(Mutex::new(0_u32));
        let observed = Arc::clone(&calls);
        timeline.register_mutation_observer(move |_: &TimelineController| {
            *observed.lock().unwrap() += 1;
        });
        timeline.set_state(PlaybackMode::Paused);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    // -----------------------------------------------------------------------
    // Seeking
    // -----------------------------------------------------------------------

    #[test]
    fn seek_folds_untimestamped_events_eagerly() {
        let (mut timeline, _clock) = paused_with(build_log());
        assert_eq!(timeline.events_played(), 1);
        assert_eq!(timeline.graph().details_dir(), Some("/out/.d"));
        assert!(timeline.graph().nodes().is_empty());
    }

    #[test]
    fn seek_stops_at_first_later_event() {
        let (mut timeline, _clock) = paused_with(vec![
            create(1, "a", &[], SECOND),
            create(2, "b", &[], 5 * SECOND),
            create(3, "c", &[], 2 * SECOND),
        ]);
        timeline.set_current_build_time(3.0);
        assert_eq!(timeline.events_played(), 1);
        timeline.set_current_build_time(5.0);
        assert_eq!(timeline.events_played(), 3);
    }

    #[test]
    fn backward_seek_matches_direct_seek() {
        for (later, earlier) in [(9.0, 2.0), (7.5, 6.0), (4.0, 0.0), (9.0, 8.99)] {
            let (mut roundabout, _c1) = paused_with(build_log());
            roundabout.set_current_build_time(later);
            roundabout.set_current_build_time(earlier);

            let (mut direct, _c2) = paused_with(build_log());
            direct.set_current_build_time(earlier);

            assert_eq!(roundabout.events_played(), direct.events_played());
            assert_eq!(roundabout.graph().snapshot(), direct.graph().snapshot());
            assert_eq!(
                roundabout.graph().details_dir(),
                direct.graph().details_dir()
            );
        }
    }

    #[test]
    fn incremental_and_replayed_folds_agree_for_every_prefix() {
        let log = build_log();
        let times: Vec<f64> = (0_u8..=10).map(f64::from).collect();

        let (mut incremental, _c1) = paused_with(log.clone());
        for &time in &times {
            incremental.set_current_build_time(time);

            let (mut replayed, _c2) = paused_with(log.clone());
            replayed.set_current_build_time(10.0);
            replayed.set_current_build_time(time);

            assert_eq!(incremental.events_played(), replayed.events_played());
            assert_eq!(
                incremental.graph().snapshot(),
                replayed.graph().snapshot(),
                "time {time}"
            );
        }
    }

    #[test]
    fn seek_notifies_observers_once_and_sinks_on_advance() {
        let (mut timeline, _clock) = paused_with(build_log());
        let mutations = Arc::new(Mutex::new(0_u32));
        let updates = Arc::new(Mutex::new(Vec::new()));

        let observed = Arc::clone(&mutations);
        timeline.register_mutation_observer(move |_: &TimelineController| {
            *observed.lock().unwrap() += 1;
        });
        let received = Arc::clone(&updates);
        timeline.register_graph_sink(move |nodes: &[Node], edges: &[Edge]| {
            received.lock().unwrap().push((nodes.len(), edges.len()));
        });

        timeline.set_current_build_time(3.0);
        assert_eq!(*mutations.lock().unwrap(), 1);
        assert_eq!(*updates.lock().unwrap(), vec![(2, 1)]);

        // No new events crossed: observers hear about it, sinks do not.
        timeline.set_current_build_time(3.5);
        assert_eq!(*mutations.lock().unwrap(), 2);
        assert_eq!(updates.lock().unwrap().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    #[test]
    fn step_forward_visits_each_visible_event_once() {
        let (mut timeline, _clock) = paused_with(build_log());
        let mut visited = Vec::new();
        loop {
            let before = timeline.events_played();
            timeline.step_forward_event();
            if timeline.events_played() == before {
                break;
            }
            visited.push(timeline.current_time());
        }

        // Event at 2s creates a hidden node and the one at 5s refers to it.
        assert_eq!(visited, vec![1.0, 3.0, 4.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(timeline.events_played(), timeline.events_fetched());
    }

    #[test]
    fn step_forward_folds_a_hidden_tail() {
        let (mut timeline, _clock) = paused_with(vec![
            Event::startup_params(StartupParams::with_details_dir("/out/internal")),
            create(1, "bin/app", &[], SECOND),
            Event::complete(1_u64).at_us(2 * SECOND),
            create(2, "/out/internal/stamp", &[], 3 * SECOND),
            Event::executing(2_u64).at_us(4 * SECOND),
            Event::complete(2_u64).at_us(5 * SECOND),
        ]);

        for _ in 0..20 {
            timeline.step_forward_event();
        }

        assert_eq!(timeline.events_played(), timeline.events_fetched());
        assert_eq!(timeline.current_time(), 5.0);
        assert_eq!(timeline.graph().nodes().len(), 1);
    }

    #[test]
    fn step_forward_on_a_fully_folded_log_stays_put() {
        let (mut timeline, _clock) = paused_with(build_log());
        timeline.set_current_build_time(12.0);
        timeline.step_forward_event();
        assert_eq!(timeline.current_time(), 12.0);
        assert_eq!(timeline.events_played(), 10);
    }

    #[test]
    fn step_forward_never_moves_backward() {
        let (mut timeline, _clock) = paused_with(vec![
            create(1, "a", &[], 5 * SECOND),
            create(2, "b", &[], 2 * SECOND),
        ]);
        timeline.step_forward_event();
        assert_eq!(timeline.current_time(), 5.0);
        assert_eq!(timeline.events_played(), 2);

        timeline.step_forward_event();
        assert_eq!(timeline.current_time(), 5.0);
    }

    #[test]
    fn step_back_walks_to_earlier_visible_events() {
        let (mut timeline, _clock) = paused_with(build_log());
        timeline.set_current_build_time(7.0);

        timeline.step_back_event();
        assert_eq!(timeline.current_time(), 6.0);
        assert_eq!(
            timeline.graph().node(&NodeId::from(1_u64)).unwrap().state,
            NodeState::Executing
        );

        // 5s only touches the hidden node.
        timeline.step_back_event();
        assert_eq!(timeline.current_time(), 4.0);

        timeline.step_back_event();
        timeline.step_back_event();
        assert_eq!(timeline.current_time(), 1.0);

        timeline.step_back_event();
        assert_eq!(timeline.current_time(), 0.0);
        assert_eq!(timeline.events_played(), 1);
        assert!(timeline.graph().nodes().is_empty());
    }

    #[test]
    fn status_reflects_accessors() {
        let (mut timeline, _clock) = paused_with(build_log());
        timeline.set_current_build_time(4.0);
        let status = timeline.status();
        assert_eq!(status.mode, PlaybackMode::Paused);
        assert_eq!(status.current_time, 4.0);
        assert_eq!(status.end_time, 9.0);
        assert_eq!(status.events_played, 5);
        assert_eq!(status.events_fetched, 10);
        assert!(!status.stream_finished);
    }
}
