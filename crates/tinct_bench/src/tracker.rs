//! Render-latency tracking per propagation strategy.
//!
//! Results are only kept while a benchmark is running; samples reported while
//! stopped are dropped, not queued. Statistics are recomputed from the full
//! result list on every call.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::{MonotonicClock, SharedClock};

/// How a consumer receives the theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Subscribed to the theme store
    Context,
    /// Reads CSS custom properties from the style surface
    Tokens,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Context, Strategy::Tokens];

    pub fn id(self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Tokens => "tokens",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Context => "Store Context",
            Self::Tokens => "CSS Tokens",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One recorded render
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub method: Strategy,
    /// Milliseconds
    pub render_time: f64,
    /// Tracker clock reading at capture, milliseconds
    pub timestamp: f64,
}

/// Aggregate latency for one strategy. All zero when nothing was recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStats {
    pub avg_render_time: f64,
    pub p50_render_time: f64,
    pub p99_render_time: f64,
    pub total_renders: usize,
}

impl StrategyStats {
    fn from_times(mut times: Vec<f64>) -> Self {
        if times.is_empty() {
            return Self::default();
        }
        times.sort_by(f64::total_cmp);

        let n = times.len();
        let p50_index = (n as f64 * 0.5).floor() as usize;
        let p99_index = ((n as f64 * 0.99).floor() as usize).saturating_sub(1);

        Self {
            avg_render_time: times.iter().sum::<f64>() / n as f64,
            p50_render_time: times[p50_index.min(n - 1)],
            p99_render_time: times[p99_index.min(n - 1)],
            total_renders: n,
        }
    }
}

/// Point-in-time statistics for both strategies
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub context: StrategyStats,
    pub tokens: StrategyStats,
}

impl BenchmarkStats {
    pub fn get(&self, strategy: Strategy) -> &StrategyStats {
        match strategy {
            Strategy::Context => &self.context,
            Strategy::Tokens => &self.tokens,
        }
    }

    /// Strategy with the lower average, once both have samples.
    ///
    /// Equal averages go to tokens.
    pub fn winner(&self) -> Option<Strategy> {
        if self.context.total_renders == 0 || self.tokens.total_renders == 0 {
            return None;
        }
        if self.context.avg_render_time < self.tokens.avg_render_time {
            Some(Strategy::Context)
        } else {
            Some(Strategy::Tokens)
        }
    }

    /// Absolute difference of the averages, once both have samples
    pub fn difference(&self) -> Option<f64> {
        self.winner()
            .map(|_| (self.context.avg_render_time - self.tokens.avg_render_time).abs())
    }
}

#[derive(Default)]
struct Session {
    running: bool,
    results: Vec<BenchmarkResult>,
}

/// Shared benchmark tracker handle. Clones record into the same session.
#[derive(Clone)]
pub struct BenchmarkTracker {
    session: Arc<RwLock<Session>>,
    clock: SharedClock,
}

impl Default for BenchmarkTracker {
    fn default() -> Self {
        Self::new(Arc::new(MonotonicClock::new()))
    }
}

impl BenchmarkTracker {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            clock,
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Drop previous results and start accepting samples
    pub fn start_benchmark(&self) {
        let mut session = self.session.write().unwrap();
        session.results.clear();
        session.running = true;
        tracing::debug!("BenchmarkTracker: started");
    }

    /// Stop accepting samples; recorded results are kept
    pub fn end_benchmark(&self) {
        let mut session = self.session.write().unwrap();
        session.running = false;
        tracing::debug!(
            "BenchmarkTracker: stopped with {} results",
            session.results.len()
        );
    }

    pub fn is_running(&self) -> bool {
        self.session.read().unwrap().running
    }

    /// Record a render of `render_time` milliseconds. Ignored while stopped.
    pub fn record_render(&self, method: Strategy, render_time: f64) {
        let mut session = self.session.write().unwrap();
        if !session.running {
            return;
        }
        let timestamp = self.clock.now_ms();
        tracing::trace!("BenchmarkTracker: {} {:.3}ms", method.id(), render_time);
        session.results.push(BenchmarkResult {
            method,
            render_time,
            timestamp,
        });
    }

    pub fn record_duration(&self, method: Strategy, elapsed: Duration) {
        self.record_render(method, elapsed.as_secs_f64() * 1000.0);
    }

    pub fn get_stats(&self) -> BenchmarkStats {
        let session = self.session.read().unwrap();
        let times = |strategy: Strategy| -> Vec<f64> {
            session
                .results
                .iter()
                .filter(|r| r.method == strategy)
                .map(|r| r.render_time)
                .collect()
        };
        BenchmarkStats {
            context: StrategyStats::from_times(times(Strategy::Context)),
            tokens: StrategyStats::from_times(times(Strategy::Tokens)),
        }
    }

    /// The last `count` results, oldest first
    pub fn get_recent_results(&self, count: usize) -> Vec<BenchmarkResult> {
        let session = self.session.read().unwrap();
        let start = session.results.len().saturating_sub(count);
        session.results[start..].to_vec()
    }

    /// Drop all results regardless of running state
    pub fn clear(&self) {
        self.session.write().unwrap().results.clear();
    }

    pub fn len(&self) -> usize {
        self.session.read().unwrap().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BenchmarkTracker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkTracker")
            .field("running", &self.is_running())
            .field("results", &self.len())
            .finish()
    }
}
