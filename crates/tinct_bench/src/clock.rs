//! Monotonic time sources for render measurements.
//!
//! All readings are milliseconds as `f64`, measured from the clock's own
//! origin. [`ManualClock`] only moves when told to, which keeps latency
//! tests deterministic.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A monotonic millisecond clock.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock advanced explicitly. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `ms` milliseconds. Negative steps are ignored.
    pub fn advance_ms(&self, ms: f64) {
        if ms > 0.0 {
            *self.now.lock().unwrap() += ms;
        }
    }

    pub fn advance(&self, by: Duration) {
        self.advance_ms(by.as_secs_f64() * 1000.0);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}

pub type SharedClock = Arc<dyn Clock>;
