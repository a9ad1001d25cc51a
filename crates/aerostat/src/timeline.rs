//! One-shot cues evaluated at frame granularity.
//!
//! A cue fires on the first frame whose clock time is at or past its due
//! time, so late frames fire it late rather than never.

use std::time::Duration;

/// Timed preloader events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Show the cloud text layer.
    StartText,
    /// Shrink the cloud text away.
    DissipateText,
    /// Fade the preloader out.
    FadeOut,
    /// Leave for the target page and stop.
    Navigate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    at: Duration,
    cue: Cue,
}

/// Pending cues ordered by due time.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    pending: Vec<Scheduled>,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `cue` at clock time `at`. Cues due at the same time fire in
    /// scheduling order.
    pub fn schedule(&mut self, at: Duration, cue: Cue) {
        let index = self.pending.partition_point(|s| s.at <= at);
        self.pending.insert(index, Scheduled { at, cue });
        tracing::trace!(?cue, at_ms = at.as_millis() as u64, "Cue scheduled");
    }

    /// Schedules `cue` at `now + delay`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, cue: Cue) {
        self.schedule(now.saturating_add(delay), cue);
    }

    /// Removes and returns every cue due at `now`, earliest first.
    pub fn due(&mut self, now: Duration) -> Vec<Cue> {
        let count = self.pending.partition_point(|s| s.at <= now);
        self.pending.drain(..count).map(|s| s.cue).collect()
    }

    /// Time of the next cue.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|s| s.at)
    }

    /// True if `cue` is still pending.
    #[must_use]
    pub fn is_pending(&self, cue: Cue) -> bool {
        self.pending.iter().any(|s| s.cue == cue)
    }

    /// Cues not yet fired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending cue.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
