//! # Frame Clock
//!
//! Variable-timestep frame timing driven by the host's display refresh.
//!
//! ## Design
//!
//! The host calls the scheduler once per refresh. The timer must:
//! - Measure real elapsed time from a monotonic source
//! - Clamp huge deltas after a stall (tab in background, debugger pause)
//! - Keep cheap rolling statistics for diagnostics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait DisplayClock {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually driven clock for tests and headless simulation.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.micros.fetch_add(by.as_micros() as u64, Ordering::Relaxed);
    }
}

impl DisplayClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Relaxed))
    }
}

/// Timing of a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Frame number, starting at 1.
    pub frame_number: u64,
    /// Clamped seconds since the previous frame.
    pub delta_seconds: f32,
    /// Time since the timer was created.
    pub elapsed: Duration,
}

impl FrameTime {
    /// Elapsed time in milliseconds as a float, for oscillators.
    #[inline]
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTimerStats {
    /// Shortest raw delta observed (microseconds).
    pub min_delta_us: u64,
    /// Longest raw delta observed (microseconds).
    pub max_delta_us: u64,
    /// Rolling average delta (microseconds).
    pub avg_delta_us: u64,
    /// Frames whose raw delta exceeded the clamp.
    pub clamped_frames: u64,
}

/// Turns a [`DisplayClock`] into clamped per-frame deltas.
pub struct FrameTimer<C: DisplayClock> {
    /// Time source.
    clock: C,
    /// Clock reading at creation.
    origin: Duration,
    /// Clock reading at the previous tick.
    last: Duration,
    /// Largest delta handed out.
    max_step: Duration,
    /// Frames measured.
    frame_count: u64,
    /// Statistics.
    stats: FrameTimerStats,
}

impl<C: DisplayClock> FrameTimer<C> {
    /// Creates a timer. Deltas larger than `max_step` are clamped.
    #[must_use]
    pub fn new(clock: C, max_step: Duration) -> Self {
        let now = clock.now();
        Self {
            clock,
            origin: now,
            last: now,
            max_step,
            frame_count: 0,
            stats: FrameTimerStats {
                min_delta_us: u64::MAX,
                ..FrameTimerStats::default()
            },
        }
    }

    /// Measures the time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.clock.now();
        let raw = now.saturating_sub(self.last);
        self.last = now;
        self.frame_count += 1;

        let raw_us = raw.as_micros() as u64;
        self.stats.min_delta_us = self.stats.min_delta_us.min(raw_us);
        self.stats.max_delta_us = self.stats.max_delta_us.max(raw_us);
        self.stats.avg_delta_us = if self.frame_count == 1 {
            raw_us
        } else {
            (self.stats.avg_delta_us * 15 + raw_us) / 16
        };

        let delta = if raw > self.max_step {
            self.stats.clamped_frames += 1;
            tracing::trace!(raw_us, "frame delta clamped");
            self.max_step
        } else {
            raw
        };

        FrameTime {
            frame_number: self.frame_count,
            delta_seconds: delta.as_secs_f32(),
            elapsed: now.saturating_sub(self.origin),
        }
    }

    /// Returns the underlying clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns timing statistics.
    #[must_use]
    pub fn stats(&self) -> FrameTimerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_millis(5));
        assert_eq!(other.now(), Duration::from_millis(5));
    }

    #[test]
    fn test_tick_measures_delta() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new(clock.clone(), Duration::from_millis(100));

        clock.advance(Duration::from_millis(16));
        let frame = timer.tick();
        assert_eq!(frame.frame_number, 1);
        assert!((frame.delta_seconds - 0.016).abs() < 1e-6);
        assert_eq!(frame.elapsed, Duration::from_millis(16));
    }

    #[test]
    fn test_tick_clamps_stall() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new(clock.clone(), Duration::from_millis(100));

        clock.advance(Duration::from_secs(3));
        let frame = timer.tick();
        assert!((frame.delta_seconds - 0.1).abs() < 1e-6);
        assert_eq!(frame.elapsed, Duration::from_secs(3));
        assert_eq!(timer.stats().clamped_frames, 1);
    }

    #[test]
    fn test_zero_delta_frame() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new(clock, Duration::from_millis(100));
        let frame = timer.tick();
        assert_eq!(frame.delta_seconds, 0.0);
    }
}
