//! Wall-clock source for the timeline controller.
//!
//! Playback time is build time plus wall-clock time elapsed since an anchor.
//! The controller never reads the system clock directly; it asks a
//! [`PlaybackClock`], so tests can drive time by hand with [`ManualClock`].

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use buildscope_types::MICROSECONDS_PER_SECOND;

/// Source of monotonic wall-clock seconds.
///
/// Only differences between two readings are meaningful; the origin is
/// arbitrary.
pub trait PlaybackClock: Send + Sync + Debug {
    /// Seconds elapsed since the clock's origin.
    fn now_seconds(&self) -> f64;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock for SystemClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock with microsecond resolution.
///
/// Clones share the same counter, so a test can keep one handle and give
/// the other to a controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let micros = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(micros, Ordering::AcqRel);
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Set the absolute reading in microseconds.
    pub fn set_micros(&self, micros: u64) {
        self.micros.store(micros, Ordering::Release);
    }
}

impl PlaybackClock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.micros.load(Ordering::Acquire) as f64 / MICROSECONDS_PER_SECOND
    }
}
