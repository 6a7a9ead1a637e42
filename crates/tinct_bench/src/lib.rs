//! Tinct Benchmark Harness
//!
//! Measures how quickly a theme change reaches two kinds of consumer:
//!
//! - a [`ContextConsumer`] subscribed to the theme store
//! - a [`TokenConsumer`] reading CSS custom properties off the style surface
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tinct_bench::{BenchmarkHarness, BenchmarkTracker, ManualClock};
//! use tinct_theme::{default_theme, StyleDocument, ThemePreset, ThemeStore, TokenWriter};
//!
//! let store = ThemeStore::with_default(TokenWriter::attached(StyleDocument::new()), default_theme());
//! let tracker = BenchmarkTracker::new(Arc::new(ManualClock::new()));
//! let (mut harness, _handle) = BenchmarkHarness::new(store, tracker.clone());
//!
//! tracker.start_benchmark();
//! harness.change_theme(ThemePreset::Dark);
//! tracker.end_benchmark();
//!
//! let stats = tracker.get_stats();
//! assert_eq!(stats.context.total_renders, 1);
//! assert_eq!(stats.tokens.total_renders, 1);
//! ```

pub mod clock;
pub mod consumer;
pub mod format;
pub mod harness;
pub mod poller;
pub mod report;
pub mod tracker;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use consumer::{render_swatches, ContextConsumer, Swatch, TokenConsumer};
pub use format::{format_time, performance_color};
pub use harness::{
    BenchmarkCommand, BenchmarkHarness, HarnessHandle, StressConfig, DEFAULT_STRESS_DURATION,
    DEFAULT_STRESS_INTERVAL,
};
pub use poller::{StatsPoller, DEFAULT_POLL_INTERVAL};
pub use report::BenchmarkReport;
pub use tracker::{BenchmarkResult, BenchmarkStats, BenchmarkTracker, Strategy, StrategyStats};
