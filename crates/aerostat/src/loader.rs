//! # Bounded Concurrent Loader
//!
//! Runs a queue of async loads with at most `max_concurrent` in flight and a
//! fixed delay between launches, so the first models arrive early without
//! saturating the network.
//!
//! ```text
//! queue ──┬─ launch ── stagger ── launch ── stagger ── launch   (N in flight)
//!         │
//!         └─ join_next ─→ on_complete ─→ launch next ─→ ...
//! ```
//!
//! The loader never fails: each task reports its own outcome through the
//! completion callback, and a panicked task is logged and counted.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::config::LoaderConfig;

/// Counters for one [`BoundedLoader::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Tasks started.
    pub launched: usize,
    /// Tasks whose output reached the callback.
    pub completed: usize,
    /// Tasks that panicked or were cancelled.
    pub aborted: usize,
    /// Most tasks observed in flight at once.
    pub peak_in_flight: usize,
}

/// Queue runner with a concurrency cap and launch stagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedLoader {
    max_concurrent: usize,
    stagger: Duration,
}

impl Default for BoundedLoader {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl BoundedLoader {
    /// Creates a loader. A cap of zero is treated as one.
    #[must_use]
    pub fn new(max_concurrent: usize, stagger: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            stagger,
        }
    }

    /// Creates a loader from configuration.
    #[must_use]
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.max_concurrent, config.stagger())
    }

    /// Concurrency cap.
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Delay between launches.
    #[must_use]
    pub const fn stagger(&self) -> Duration {
        self.stagger
    }

    /// Runs `task` for every item and hands each output to `on_complete`.
    ///
    /// Resolves once the queue is empty and every launched task finished.
    /// Must be called inside a tokio runtime.
    pub async fn run<I, T, F, Fut, C>(&self, items: I, mut task: F, mut on_complete: C) -> LoaderStats
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
        C: FnMut(Fut::Output),
    {
        let mut queue: VecDeque<T> = items.into_iter().collect();
        let mut in_flight = JoinSet::new();
        let mut stats = LoaderStats::default();

        tracing::debug!(
            queued = queue.len(),
            max_concurrent = self.max_concurrent,
            stagger_ms = self.stagger.as_millis() as u64,
            "Loader started"
        );

        loop {
            while in_flight.len() < self.max_concurrent {
                let Some(item) = queue.pop_front() else {
                    break;
                };
                if stats.launched > 0 && !self.stagger.is_zero() {
                    tokio::time::sleep(self.stagger).await;
                }
                in_flight.spawn(task(item));
                stats.launched += 1;
                stats.peak_in_flight = stats.peak_in_flight.max(in_flight.len());
            }

            match in_flight.join_next().await {
                Some(Ok(output)) => {
                    stats.completed += 1;
                    on_complete(output);
                }
                Some(Err(error)) => {
                    stats.aborted += 1;
                    tracing::warn!(%error, "Load task aborted");
                }
                None => break,
            }
        }

        tracing::debug!(
            launched = stats.launched,
            completed = stats.completed,
            aborted = stats.aborted,
            "Loader drained"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_all_items_complete() {
        let loader = BoundedLoader::new(3, Duration::ZERO);
        let mut outputs = Vec::new();
        let stats = loader
            .run(0..7_u32, |i| async move { i * 2 }, |out| outputs.push(out))
            .await;

        outputs.sort_unstable();
        assert_eq!(outputs, vec![0, 2, 4, 6, 8, 10, 12]);
        assert_eq!(stats.launched, 7);
        assert_eq!(stats.completed, 7);
        assert_eq!(stats.aborted, 0);
    }

    #[tokio::test]
    async fn test_never_exceeds_cap() {
        let loader = BoundedLoader::new(3, Duration::from_millis(1));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let stats = loader
            .run(
                0..10,
                |_| {
                    let current = Arc::clone(&current);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        current.fetch_sub(1, Ordering::SeqCst);
                    }
                },
                |()| {},
            )
            .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(stats.peak_in_flight <= 3);
        assert_eq!(stats.completed, 10);
    }

    #[tokio::test]
    async fn test_empty_queue_resolves() {
        let stats = BoundedLoader::default()
            .run(Vec::<u8>::new(), |i| async move { i }, |_| {})
            .await;
        assert_eq!(stats, LoaderStats::default());
    }

    #[test]
    fn test_zero_cap_is_one() {
        assert_eq!(BoundedLoader::new(0, Duration::ZERO).max_concurrent(), 1);
    }
}
