//! Theme store
//!
//! `ThemeStore` owns the current theme and is the only place it changes.
//! It is an explicitly constructed handle: clone it and pass it to whatever
//! needs to read or change the theme. Dropping the last handle discards the
//! state without writing anything back.
//!
//! Every successful change goes validate -> merge -> write tokens -> publish.
//! Tokens are written while the state lock is held, so the style surface and
//! the stored theme never disagree about ordering. Subscribers are invoked
//! after the lock is released and only ever see fully merged themes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::ThemeError;
use crate::surface::TokenWriter;
use crate::theme::{PartialTheme, Theme};
use crate::validate::validate_partial;

/// Store lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeMode {
    Uninitialized,
    /// The default theme passed to [`ThemeStore::initialize`] is active
    Default,
    /// A theme applied through [`ThemeStore::apply_theme`] is active
    Custom,
}

impl ThemeMode {
    /// Value mirrored onto the root `data-theme` attribute
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Uninitialized => "",
            Self::Default => "default",
            Self::Custom => "custom",
        }
    }
}

/// UI flags coordinating a transition indicator with in-flight fetches
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionState {
    pub is_loading: bool,
    /// Name of the theme being loaded; empty when idle
    pub pending_theme_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Theme subscriber, called with every published theme
pub type ThemeSubscriber = Arc<dyn Fn(&Theme) + Send + Sync>;

/// Transition indicator listener
pub type TransitionListener = Arc<dyn Fn(&TransitionState) + Send + Sync>;

struct Mounted {
    mode: ThemeMode,
    current: Theme,
    default: Theme,
}

struct StoreInner {
    writer: TokenWriter,
    state: RwLock<Option<Mounted>>,
    transition: RwLock<TransitionState>,
    subscribers: RwLock<Vec<(SubscriptionId, ThemeSubscriber)>>,
    transition_listeners: RwLock<Vec<(SubscriptionId, TransitionListener)>>,
    next_id: AtomicU64,
}

/// Handle to a theme store. Clones share the same state.
#[derive(Clone)]
pub struct ThemeStore {
    inner: Arc<StoreInner>,
}

impl ThemeStore {
    /// Create an uninitialized store writing through `writer`
    pub fn new(writer: TokenWriter) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                writer,
                state: RwLock::new(None),
                transition: RwLock::new(TransitionState::default()),
                subscribers: RwLock::new(Vec::new()),
                transition_listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Create a store and initialize it with `default`
    pub fn with_default(writer: TokenWriter, default: Theme) -> Self {
        let store = Self::new(writer);
        store.initialize(default);
        store
    }

    /// Write `default`'s tokens and make it the active and reset theme.
    ///
    /// Runs synchronously so the surface is styled before any consumer
    /// paints. Calling it again behaves like a remount with a new default;
    /// subscribers are notified whenever the active theme changes.
    pub fn initialize(&self, default: Theme) {
        let changed = {
            let mut state = self.inner.state.write().unwrap();
            let changed = match state.as_ref() {
                Some(mounted) => {
                    tracing::debug!("ThemeStore::initialize - remounting with new default");
                    mounted.current != default
                }
                None => true,
            };
            self.inner.writer.write(&default);
            self.inner.writer.mark_root(ThemeMode::Default.attribute());
            *state = Some(Mounted {
                mode: ThemeMode::Default,
                current: default.clone(),
                default: default.clone(),
            });
            changed
        };

        if changed {
            self.publish(&default);
        }
    }

    /// Validate `partial`, merge it onto the current theme, write tokens and
    /// publish.
    ///
    /// On a validation failure the error is logged, the previous theme's
    /// tokens are rewritten and the state is left untouched; the error is
    /// returned for callers that care, but the store has already recovered.
    pub fn apply_theme(&self, partial: &PartialTheme) -> Result<Theme, ThemeError> {
        let merged = {
            let mut state = self.inner.state.write().unwrap();
            let mounted = state.as_mut().ok_or(ThemeError::NotInitialized)?;

            let patch = match validate_partial(partial) {
                Ok(patch) => patch,
                Err(err) => {
                    tracing::error!("ThemeStore::apply_theme - rejected update: {}", err);
                    self.inner.writer.write(&mounted.current);
                    return Err(err);
                }
            };

            let merged = mounted.current.merge(&patch);
            self.inner.writer.write(&merged);
            self.inner.writer.mark_root(ThemeMode::Custom.attribute());
            tracing::debug!(
                "ThemeStore::apply_theme - {:?} -> Custom (background {})",
                mounted.mode,
                merged.background_color
            );
            mounted.current = merged.clone();
            mounted.mode = ThemeMode::Custom;
            merged
        };

        self.publish(&merged);
        Ok(merged)
    }

    /// Reset to the default theme. Idempotent.
    pub fn remove_theme(&self) -> Result<Theme, ThemeError> {
        let (default, changed) = {
            let mut state = self.inner.state.write().unwrap();
            let mounted = state.as_mut().ok_or(ThemeError::NotInitialized)?;
            let changed = mounted.current != mounted.default;

            self.inner.writer.write(&mounted.default);
            self.inner.writer.mark_root(ThemeMode::Default.attribute());
            tracing::debug!("ThemeStore::remove_theme - {:?} -> Default", mounted.mode);
            mounted.current = mounted.default.clone();
            mounted.mode = ThemeMode::Default;
            (mounted.default.clone(), changed)
        };

        if changed {
            self.publish(&default);
        }
        Ok(default)
    }

    /// Current theme, `None` before [`initialize`](Self::initialize)
    pub fn theme(&self) -> Option<Theme> {
        self.inner
            .state
            .read()
            .unwrap()
            .as_ref()
            .map(|m| m.current.clone())
    }

    pub fn default_theme(&self) -> Option<Theme> {
        self.inner
            .state
            .read()
            .unwrap()
            .as_ref()
            .map(|m| m.default.clone())
    }

    pub fn mode(&self) -> ThemeMode {
        self.inner
            .state
            .read()
            .unwrap()
            .as_ref()
            .map_or(ThemeMode::Uninitialized, |m| m.mode)
    }

    pub fn writer(&self) -> &TokenWriter {
        &self.inner.writer
    }

    // ========== Subscriptions ==========

    /// Register `subscriber` to be called with every published theme
    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&Theme) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner
            .subscribers
            .write()
            .unwrap()
            .push((id, Arc::new(subscriber)));
        id
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.write().unwrap();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().unwrap().len()
    }

    fn publish(&self, theme: &Theme) {
        let subscribers: Vec<ThemeSubscriber> = self
            .inner
            .subscribers
            .read()
            .unwrap()
            .iter()
            .map(|(_, s)| s.clone())
            .collect();
        for subscriber in subscribers {
            subscriber(theme);
        }
    }

    // ========== Transition flags ==========

    pub fn set_loading(&self, loading: bool) {
        self.update_transition(|t| t.is_loading = loading);
    }

    pub fn set_pending_theme_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.update_transition(|t| t.pending_theme_name = name);
    }

    pub fn is_loading(&self) -> bool {
        self.inner.transition.read().unwrap().is_loading
    }

    pub fn pending_theme_name(&self) -> String {
        self.inner.transition.read().unwrap().pending_theme_name.clone()
    }

    pub fn transition(&self) -> TransitionState {
        self.inner.transition.read().unwrap().clone()
    }

    /// Register a transition indicator; called whenever a flag changes
    pub fn subscribe_transition<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&TransitionState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner
            .transition_listeners
            .write()
            .unwrap()
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe_transition(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.transition_listeners.write().unwrap();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    fn update_transition(&self, update: impl FnOnce(&mut TransitionState)) {
        let snapshot = {
            let mut transition = self.inner.transition.write().unwrap();
            let before = transition.clone();
            update(&mut transition);
            if *transition == before {
                return;
            }
            transition.clone()
        };

        let listeners: Vec<TransitionListener> = self
            .inner
            .transition_listeners
            .read()
            .unwrap()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("mode", &self.mode())
            .field("transition", &self.transition())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{default_theme, ThemePreset};
    use crate::surface::{theme_to_css, StyleDocument, THEME_ATTRIBUTE, THEME_STYLE_ID};
    use crate::tokens::HexColor;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn mounted() -> (ThemeStore, StyleDocument) {
        let doc = StyleDocument::new();
        let store = ThemeStore::with_default(TokenWriter::attached(doc.clone()), default_theme());
        (store, doc)
    }

    fn tokens(doc: &StyleDocument) -> String {
        doc.get_element_by_id(THEME_STYLE_ID).unwrap().text().to_string()
    }

    #[test]
    fn uninitialized_store_rejects_changes() {
        let store = ThemeStore::new(TokenWriter::detached());
        assert_eq!(store.mode(), ThemeMode::Uninitialized);
        assert_eq!(store.theme(), None);
        assert_eq!(
            store.apply_theme(&PartialTheme::new().primary("#000000")),
            Err(ThemeError::NotInitialized)
        );
        assert_eq!(store.remove_theme(), Err(ThemeError::NotInitialized));
    }

    #[test]
    fn initialize_writes_default_tokens() {
        let (store, doc) = mounted();
        assert_eq!(store.mode(), ThemeMode::Default);
        assert_eq!(tokens(&doc), theme_to_css(&default_theme()));
        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE).as_deref(), Some("default"));
    }

    #[test]
    fn apply_moves_to_custom_and_writes_tokens() {
        let (store, doc) = mounted();
        let applied = store.apply_theme(&ThemePreset::Light.payload()).unwrap();
        assert_eq!(applied, ThemePreset::Light.theme());
        assert_eq!(store.mode(), ThemeMode::Custom);
        assert_eq!(tokens(&doc), theme_to_css(&applied));
        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE).as_deref(), Some("custom"));
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let (store, doc) = mounted();
        store.apply_theme(&ThemePreset::Purple.payload()).unwrap();
        let before_theme = store.theme();
        let before_tokens = tokens(&doc);

        let err = store
            .apply_theme(&PartialTheme::new().background("#ffffff").primary("red"))
            .unwrap_err();
        assert!(err.is_invalid_color());
        assert_eq!(store.theme(), before_theme);
        assert_eq!(tokens(&doc), before_tokens);
        assert_eq!(store.mode(), ThemeMode::Custom);
    }

    #[test]
    fn invalid_update_is_not_published() {
        let (store, _doc) = mounted();
        let seen = Arc::new(Mutex::new(0));
        let counter = seen.clone();
        store.subscribe(move |_| *counter.lock().unwrap() += 1);

        let _ = store.apply_theme(&PartialTheme::new().secondary("#12"));
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn remove_restores_default_exactly() {
        let (store, doc) = mounted();
        store.apply_theme(&ThemePreset::Solarized.payload()).unwrap();
        store
            .apply_theme(&PartialTheme::new().text("#ABCDEF"))
            .unwrap();
        store.remove_theme().unwrap();
        assert_eq!(store.theme(), Some(default_theme()));
        assert_eq!(store.mode(), ThemeMode::Default);
        assert_eq!(tokens(&doc), theme_to_css(&default_theme()));

        store.remove_theme().unwrap();
        assert_eq!(store.theme(), Some(default_theme()));
    }

    #[test]
    fn subscribers_see_merged_theme() {
        let (store, _doc) = mounted();
        let seen: Arc<Mutex<Vec<Theme>>> = Arc::default();
        let sink = seen.clone();
        let id = store.subscribe(move |t| sink.lock().unwrap().push(t.clone()));

        store
            .apply_theme(&PartialTheme::new().background("#ffffff"))
            .unwrap();
        let got = seen.lock().unwrap().clone();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].text_color, HexColor::BLACK);
        assert_eq!(got[0].primary_color, default_theme().primary_color);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.remove_theme().unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn subscriber_may_reenter_the_store() {
        let (store, _doc) = mounted();
        let reader = store.clone();
        let observed = Arc::new(Mutex::new(None));
        let slot = observed.clone();
        store.subscribe(move |_| *slot.lock().unwrap() = reader.theme());

        let applied = store.apply_theme(&ThemePreset::Dark.payload()).unwrap();
        assert_eq!(observed.lock().unwrap().clone(), Some(applied));
    }

    #[test]
    fn transition_listeners_fire_on_change_only() {
        let (store, _doc) = mounted();
        let events: Arc<Mutex<Vec<TransitionState>>> = Arc::default();
        let sink = events.clone();
        store.subscribe_transition(move |t| sink.lock().unwrap().push(t.clone()));

        store.set_loading(true);
        store.set_loading(true);
        store.set_pending_theme_name("solarized");
        assert!(store.is_loading());
        assert_eq!(store.pending_theme_name(), "solarized");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            TransitionState {
                is_loading: true,
                pending_theme_name: "solarized".into()
            }
        );
    }

    #[test]
    fn remount_publishes_new_default() {
        let (store, doc) = mounted();
        let seen: Arc<Mutex<Vec<Theme>>> = Arc::default();
        let sink = seen.clone();
        store.subscribe(move |t| sink.lock().unwrap().push(t.clone()));

        store.initialize(default_theme());
        assert!(seen.lock().unwrap().is_empty());

        store.apply_theme(&ThemePreset::Light.payload()).unwrap();
        let purple = ThemePreset::Purple.theme();
        store.initialize(purple.clone());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], purple);
        assert_eq!(store.default_theme(), Some(purple.clone()));
        assert_eq!(store.mode(), ThemeMode::Default);
        assert_eq!(tokens(&doc), theme_to_css(&purple));
    }

    #[test]
    fn first_initialize_reaches_early_subscribers() {
        let store = ThemeStore::new(TokenWriter::detached());
        let seen = Arc::new(Mutex::new(0));
        let counter = seen.clone();
        store.subscribe(move |_| *counter.lock().unwrap() += 1);

        store.initialize(default_theme());
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn detached_store_still_tracks_state() {
        let store = ThemeStore::with_default(TokenWriter::detached(), default_theme());
        let applied = store.apply_theme(&ThemePreset::Light.payload()).unwrap();
        assert_eq!(store.theme(), Some(applied));
    }
}
