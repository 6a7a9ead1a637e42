//! Asynchronous theme selection
//!
//! A [`ThemeSource`] resolves a theme name to a partial payload. The
//! [`ThemeLoader`] is the caller-level async path: it raises the store's
//! transition flags, awaits the source, hands the payload to
//! [`ThemeStore::apply_theme`], and clears the flags whatever happened.
//!
//! There is no cancellation. With [`ApplyOrder::CompletionOrder`] (the
//! default) a slow response that lands after a newer one still applies.
//! [`ApplyOrder::IssueOrder`] drops responses to superseded requests instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::presets::{fallback_payload, ThemePreset};
use crate::state::ThemeStore;
use crate::theme::{PartialTheme, Theme};

/// Latency of the simulated theme endpoint
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(1500);

/// Remote source of theme payloads
#[async_trait]
pub trait ThemeSource: Send + Sync {
    async fn fetch_theme(&self, name: &str) -> Result<PartialTheme, ThemeError>;
}

/// Payload for `name` without any latency: the preset palette for known
/// names, a primary-color tweak for anything else.
pub fn sync_payload(name: &str) -> PartialTheme {
    match ThemePreset::from_id(name) {
        Some(preset) => preset.payload(),
        None => fallback_payload(),
    }
}

/// In-process stand-in for a remote theme endpoint.
#[derive(Clone, Debug)]
pub struct SimulatedThemeApi {
    delay: Duration,
    failing: FxHashSet<String>,
}

impl Default for SimulatedThemeApi {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_DELAY)
    }
}

impl SimulatedThemeApi {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing: FxHashSet::default(),
        }
    }

    /// Make requests for `name` fail with a network error
    pub fn with_failure(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl ThemeSource for SimulatedThemeApi {
    async fn fetch_theme(&self, name: &str) -> Result<PartialTheme, ThemeError> {
        tokio::time::sleep(self.delay).await;
        if self.failing.contains(name) {
            return Err(ThemeError::FetchFailure {
                name: name.to_string(),
                reason: "network unreachable".to_string(),
            });
        }
        Ok(sync_payload(name))
    }
}

/// Which response wins when selections overlap
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOrder {
    /// Every response applies when it arrives; the last to complete wins.
    #[default]
    CompletionOrder,
    /// Only the most recently issued request may apply.
    IssueOrder,
}

/// Result of one [`ThemeLoader::select_theme`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(Theme),
    /// A newer request was issued while this one was in flight
    Superseded,
    /// Fetch or validation failed; the store kept its previous theme
    Failed(ThemeError),
}

/// Clears the store's transition flags when dropped, so an error or a
/// dropped future never leaves the indicator up.
struct TransitionGuard<'a> {
    store: &'a ThemeStore,
    armed: bool,
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.set_loading(false);
            self.store.set_pending_theme_name("");
        }
    }
}

pub struct ThemeLoader {
    store: ThemeStore,
    source: Arc<dyn ThemeSource>,
    order: ApplyOrder,
    issued: AtomicU64,
}

impl ThemeLoader {
    pub fn new(store: ThemeStore, source: Arc<dyn ThemeSource>) -> Self {
        Self {
            store,
            source,
            order: ApplyOrder::default(),
            issued: AtomicU64::new(0),
        }
    }

    pub fn with_order(mut self, order: ApplyOrder) -> Self {
        self.order = order;
        self
    }

    pub fn store(&self) -> &ThemeStore {
        &self.store
    }

    /// Fetch `name` and apply it.
    pub async fn select_theme(&self, name: &str) -> LoadOutcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.set_loading(true);
        self.store.set_pending_theme_name(name);
        let mut guard = TransitionGuard {
            store: &self.store,
            armed: true,
        };
        tracing::debug!("ThemeLoader: fetching {:?} (request {})", name, ticket);

        let fetched = self.source.fetch_theme(name).await;

        if self.order == ApplyOrder::IssueOrder && self.issued.load(Ordering::SeqCst) != ticket {
            tracing::warn!(
                "ThemeLoader: dropping response for {:?}, request {} was superseded",
                name,
                ticket
            );
            // The newer request owns the indicator now.
            guard.armed = false;
            return LoadOutcome::Superseded;
        }

        match fetched {
            Ok(payload) => match self.store.apply_theme(&payload) {
                Ok(theme) => LoadOutcome::Applied(theme),
                Err(err) => LoadOutcome::Failed(err),
            },
            Err(err) => {
                tracing::error!("ThemeLoader: {}", err);
                LoadOutcome::Failed(err)
            }
        }
    }
}
