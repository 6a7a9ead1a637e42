//! Periodic statistics polling for displays.
//!
//! The poller compares each snapshot against the last one it emitted and only
//! reports real changes, so a display redraws at most once per interval and
//! never for an idle tracker.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};

use crate::tracker::{BenchmarkStats, BenchmarkTracker};

/// Default polling period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct StatsPoller {
    tracker: BenchmarkTracker,
    interval: Duration,
    last: BenchmarkStats,
}

impl StatsPoller {
    pub fn new(tracker: BenchmarkTracker, interval: Duration) -> Self {
        Self {
            tracker,
            interval,
            last: BenchmarkStats::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last emitted snapshot; all zeros before the first change
    pub fn last(&self) -> &BenchmarkStats {
        &self.last
    }

    /// Take a snapshot, returning it only if it differs from the last one.
    pub fn poll(&mut self) -> Option<BenchmarkStats> {
        let stats = self.tracker.get_stats();
        if stats == self.last {
            return None;
        }
        self.last = stats;
        Some(stats)
    }

    /// Clear the tracker and forget the last snapshot.
    pub fn clear(&mut self) {
        self.tracker.clear();
        self.last = BenchmarkStats::default();
    }

    /// Poll every interval until `shutdown` fires or its sender is dropped.
    ///
    /// Returns how many snapshots were emitted.
    pub async fn run<F>(mut self, mut shutdown: oneshot::Receiver<()>, mut on_change: F) -> usize
    where
        F: FnMut(&BenchmarkStats),
    {
        if self.interval.is_zero() {
            tracing::warn!("StatsPoller: zero interval, not polling");
            return 0;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut emitted = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Some(stats) = self.poll() {
                        emitted += 1;
                        on_change(&stats);
                    }
                }
            }
        }
        tracing::debug!("StatsPoller: stopped after {} updates", emitted);
        emitted
    }
}

impl std::fmt::Debug for StatsPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsPoller")
            .field("interval", &self.interval)
            .field("last", &self.last)
            .finish()
    }
}
