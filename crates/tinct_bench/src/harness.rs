//! Benchmark harness
//!
//! Theme changes reach the consumers through an explicit command channel.
//! [`HarnessHandle`] is the sending side and can be cloned freely;
//! [`BenchmarkHarness`] owns both consumers and applies each command
//! synchronously: mark the context consumer, apply the preset payload (the
//! store publishes to the context consumer), mark the token consumer, then
//! paint it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tinct_theme::{PartialTheme, Theme, ThemeError, ThemePreset, ThemeStore};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::consumer::{ContextConsumer, TokenConsumer};
use crate::tracker::BenchmarkTracker;

/// Default stress test length
pub const DEFAULT_STRESS_DURATION: Duration = Duration::from_secs(5);

/// Default gap between stress test changes
pub const DEFAULT_STRESS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BenchmarkCommand {
    ChangeTheme(ThemePreset),
    Stop,
}

/// Timing of a stress test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StressConfig {
    pub duration: Duration,
    pub interval: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_STRESS_DURATION,
            interval: DEFAULT_STRESS_INTERVAL,
        }
    }
}

/// Sending side of the harness
#[derive(Clone)]
pub struct HarnessHandle {
    tx: mpsc::UnboundedSender<BenchmarkCommand>,
    tracker: BenchmarkTracker,
    rng: Arc<Mutex<StdRng>>,
}

impl HarnessHandle {
    /// Make preset selection reproducible
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn tracker(&self) -> &BenchmarkTracker {
        &self.tracker
    }

    /// Queue a theme change. Returns false once the harness has shut down.
    pub fn change_theme(&self, preset: ThemePreset) -> bool {
        self.tx.send(BenchmarkCommand::ChangeTheme(preset)).is_ok()
    }

    pub fn random_preset(&self) -> ThemePreset {
        let all = ThemePreset::all();
        let index = self.rng.lock().unwrap().gen_range(0..all.len());
        all[index]
    }

    /// One random theme change, only while the tracker is running.
    pub fn single_test(&self) -> Option<ThemePreset> {
        if !self.tracker.is_running() {
            tracing::debug!("HarnessHandle: single test ignored, benchmark not running");
            return None;
        }
        let preset = self.random_preset();
        self.change_theme(preset).then_some(preset)
    }

    /// Issue a random change every `interval` until `duration` has passed.
    ///
    /// The first change goes out one interval after the call; a tick landing
    /// exactly on the deadline is not sent. Returns how many changes were
    /// queued.
    pub async fn stress_test(&self, config: StressConfig) -> usize {
        if config.interval.is_zero() {
            tracing::warn!("HarnessHandle: stress test needs a non-zero interval");
            return 0;
        }

        let start = Instant::now();
        let deadline = start + config.duration;
        let mut ticker = tokio::time::interval_at(start + config.interval, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut sent = 0;
        loop {
            let tick = ticker.tick().await;
            if tick >= deadline {
                break;
            }
            if !self.change_theme(self.random_preset()) {
                tracing::warn!("HarnessHandle: harness stopped during stress test");
                break;
            }
            sent += 1;
        }
        tracing::debug!("HarnessHandle: stress test sent {} changes", sent);
        sent
    }

    /// Ask the harness loop to exit after draining earlier commands
    pub fn stop(&self) -> bool {
        self.tx.send(BenchmarkCommand::Stop).is_ok()
    }
}

impl std::fmt::Debug for HarnessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Receiving side of the harness; owns the consumers under test.
pub struct BenchmarkHarness {
    store: ThemeStore,
    context: ContextConsumer,
    tokens: TokenConsumer,
    rx: mpsc::UnboundedReceiver<BenchmarkCommand>,
    applied: usize,
}

impl BenchmarkHarness {
    /// Build consumers over `store` and its style surface.
    ///
    /// A store without a surface still benchmarks the context path; the token
    /// consumer then paints an empty document.
    pub fn new(store: ThemeStore, tracker: BenchmarkTracker) -> (Self, HarnessHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let document = store.writer().document().cloned().unwrap_or_default();

        let harness = Self {
            context: ContextConsumer::new(store.clone(), tracker.clone()),
            tokens: TokenConsumer::new(document, tracker.clone()),
            store,
            rx,
            applied: 0,
        };
        let handle = HarnessHandle {
            tx,
            tracker,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        };
        (harness, handle)
    }

    pub fn context_consumer(&self) -> &ContextConsumer {
        &self.context
    }

    pub fn token_consumer(&self) -> &TokenConsumer {
        &self.tokens
    }

    /// Theme changes applied so far
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Apply one preset through the synchronous path.
    pub fn change_theme(&mut self, preset: ThemePreset) {
        if let Err(err) = self.apply_payload(&preset.payload()) {
            tracing::error!("BenchmarkHarness: {} rejected: {}", preset.id(), err);
        }
        self.applied += 1;
    }

    /// Apply `payload` and measure both consumers.
    ///
    /// The context sample runs from just before the store call until the
    /// context consumer has rendered the published theme. The token sample
    /// starts once the store call has returned, so render work done by store
    /// subscribers is never charged to it. A rejected payload records
    /// nothing, though the token consumer still repaints the restored
    /// tokens.
    pub fn apply_payload(&mut self, payload: &PartialTheme) -> Result<Theme, ThemeError> {
        self.context.begin_measurement();
        let result = self.store.apply_theme(payload);

        if result.is_ok() {
            self.tokens.begin_measurement();
        } else {
            self.context.cancel_measurement();
        }
        self.tokens.paint();
        result
    }

    /// Handle one command; returns false when the loop should exit.
    pub fn handle_command(&mut self, command: BenchmarkCommand) -> bool {
        match command {
            BenchmarkCommand::ChangeTheme(preset) => {
                tracing::trace!("BenchmarkHarness: change to {}", preset.id());
                self.change_theme(preset);
                true
            }
            BenchmarkCommand::Stop => false,
        }
    }

    /// Process commands until `Stop` or every handle is dropped.
    ///
    /// Returns the number of theme changes applied.
    pub async fn run(mut self) -> usize {
        tracing::debug!("BenchmarkHarness: running");
        while let Some(command) = self.rx.recv().await {
            if !self.handle_command(command) {
                break;
            }
        }
        tracing::debug!("BenchmarkHarness: stopped after {} changes", self.applied);
        self.applied
    }
}

impl std::fmt::Debug for BenchmarkHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkHarness")
            .field("applied", &self.applied)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tinct_theme::{default_theme, StyleDocument, TokenWriter};

    fn harness() -> (BenchmarkHarness, HarnessHandle, ThemeStore) {
        let store = ThemeStore::with_default(
            TokenWriter::attached(StyleDocument::new()),
            default_theme(),
        );
        let tracker = BenchmarkTracker::new(Arc::new(ManualClock::new()));
        let (harness, handle) = BenchmarkHarness::new(store.clone(), tracker);
        (harness, handle.seeded(7), store)
    }

    #[test]
    fn change_theme_records_both_strategies() {
        let (mut harness, handle, store) = harness();
        handle.tracker().start_benchmark();

        harness.change_theme(ThemePreset::Purple);

        assert_eq!(store.theme(), Some(ThemePreset::Purple.theme()));
        let stats = handle.tracker().get_stats();
        assert_eq!(stats.context.total_renders, 1);
        assert_eq!(stats.tokens.total_renders, 1);
        assert_eq!(harness.token_consumer().palette()[0].color, "#8b5cf6");
    }

    #[test]
    fn subscriber_work_is_not_charged_to_tokens() {
        let clock = ManualClock::new();
        let store = ThemeStore::with_default(
            TokenWriter::attached(StyleDocument::new()),
            default_theme(),
        );
        let tracker = BenchmarkTracker::new(Arc::new(clock.clone()));
        let (mut harness, _handle) = BenchmarkHarness::new(store.clone(), tracker.clone());
        let busy = clock.clone();
        store.subscribe(move |_| busy.advance_ms(5.0));

        tracker.start_benchmark();
        harness.change_theme(ThemePreset::Dark);

        let stats = tracker.get_stats();
        assert_eq!(stats.context.total_renders, 1);
        assert_eq!(stats.tokens.total_renders, 1);
        assert_eq!(stats.tokens.avg_render_time, 0.0);
    }

    #[test]
    fn rejected_change_leaves_no_stale_mark() {
        let clock = ManualClock::new();
        let store = ThemeStore::new(TokenWriter::attached(StyleDocument::new()));
        let tracker = BenchmarkTracker::new(Arc::new(clock.clone()));
        let (mut harness, _handle) = BenchmarkHarness::new(store.clone(), tracker.clone());
        tracker.start_benchmark();

        harness.change_theme(ThemePreset::Light);
        assert!(harness
            .apply_payload(&PartialTheme::new().primary("red"))
            .is_err());
        assert!(tracker.is_empty());

        clock.advance_ms(1000.0);
        store.initialize(default_theme());
        assert!(harness
            .apply_payload(&PartialTheme::new().primary("red"))
            .is_err());
        clock.advance_ms(1000.0);
        harness.change_theme(ThemePreset::Light);

        let stats = tracker.get_stats();
        assert_eq!(stats.context.total_renders, 1);
        assert_eq!(stats.context.avg_render_time, 0.0);
        assert_eq!(stats.tokens.total_renders, 1);
        assert_eq!(stats.tokens.avg_render_time, 0.0);
    }

    #[test]
    fn single_test_requires_running_tracker() {
        let (_harness, handle, _) = harness();
        assert_eq!(handle.single_test(), None);
        handle.tracker().start_benchmark();
        assert!(handle.single_test().is_some());
    }

    #[test]
    fn seeded_handles_agree() {
        let (_h1, a, _) = harness();
        let (_h2, b, _) = harness();
        let left: Vec<_> = (0..8).map(|_| a.random_preset()).collect();
        let right: Vec<_> = (0..8).map(|_| b.random_preset()).collect();
        assert_eq!(left, right);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let (harness, handle, _) = harness();
        let task = tokio::spawn(harness.run());
        handle.change_theme(ThemePreset::Light);
        handle.change_theme(ThemePreset::Dark);
        handle.stop();
        assert_eq!(task.await.unwrap(), 2);
        assert!(!handle.change_theme(ThemePreset::Light));
    }

    #[tokio::test(start_paused = true)]
    async fn stress_test_sends_every_interval() {
        let (harness, handle, _) = harness();
        handle.tracker().start_benchmark();
        let task = tokio::spawn(harness.run());

        let sent = handle.stress_test(StressConfig::default()).await;
        assert_eq!(sent, 49);

        handle.stop();
        assert_eq!(task.await.unwrap(), 49);
        let stats = handle.tracker().get_stats();
        assert_eq!(stats.context.total_renders, 49);
        assert_eq!(stats.tokens.total_renders, 49);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_stress_is_rejected() {
        let (_harness, handle, _) = harness();
        let config = StressConfig {
            duration: Duration::from_secs(1),
            interval: Duration::ZERO,
        };
        assert_eq!(handle.stress_test(config).await, 0);
    }
}
