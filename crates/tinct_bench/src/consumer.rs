//! Headless theme consumers
//!
//! Each consumer renders a palette of four swatches from whatever theme it
//! can see and, when the harness has marked a render start, reports how long
//! it took from the mark to the finished palette.
//!
//! - [`ContextConsumer`] is pushed every published theme by the store.
//! - [`TokenConsumer`] pulls the theme out of the style surface on `paint`.

use std::sync::{Arc, Mutex, RwLock};

use tinct_theme::{
    is_valid_hex_color, parse_tokens, StyleDocument, SubscriptionId, Theme, ThemeField,
    ThemeStore, THEME_STYLE_ID,
};

use crate::tracker::{BenchmarkTracker, Strategy};

/// One rendered color swatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub label: &'static str,
    pub color: String,
}

fn swatch_label(field: ThemeField) -> &'static str {
    match field {
        ThemeField::PrimaryColor => "Primary Color",
        ThemeField::SecondaryColor => "Secondary Color",
        ThemeField::BackgroundColor => "Background Color",
        ThemeField::TextColor => "Text Color",
    }
}

/// Build the palette in field order. Values that are not `#RRGGBB` render
/// nothing.
pub fn render_swatches<'a>(
    colors: impl IntoIterator<Item = (ThemeField, Option<&'a str>)>,
) -> Vec<Swatch> {
    colors
        .into_iter()
        .filter_map(|(field, color)| {
            let color = color.filter(|c| is_valid_hex_color(c))?;
            Some(Swatch {
                label: swatch_label(field),
                color: color.to_string(),
            })
        })
        .collect()
}

/// Pending render start, in tracker clock milliseconds
#[derive(Clone, Default)]
struct RenderMark(Arc<Mutex<Option<f64>>>);

impl RenderMark {
    fn set(&self, at: f64) {
        *self.0.lock().unwrap() = Some(at);
    }

    fn take(&self) -> Option<f64> {
        self.0.lock().unwrap().take()
    }
}

/// Consumer subscribed to the theme store.
///
/// Unsubscribes when dropped.
pub struct ContextConsumer {
    store: ThemeStore,
    tracker: BenchmarkTracker,
    mark: RenderMark,
    palette: Arc<RwLock<Vec<Swatch>>>,
    subscription: SubscriptionId,
}

impl ContextConsumer {
    pub fn new(store: ThemeStore, tracker: BenchmarkTracker) -> Self {
        let mark = RenderMark::default();
        let palette = Arc::new(RwLock::new(Vec::new()));

        let subscription = {
            let mark = mark.clone();
            let palette = palette.clone();
            let tracker = tracker.clone();
            store.subscribe(move |theme: &Theme| {
                let swatches = render_swatches(
                    ThemeField::ALL
                        .iter()
                        .map(|f| (*f, Some(theme.get(*f).as_str()))),
                );
                *palette.write().unwrap() = swatches;

                if let Some(started) = mark.take() {
                    let elapsed = tracker.clock().now_ms() - started;
                    tracker.record_render(Strategy::Context, elapsed);
                }
            })
        };

        // Initial render from whatever is already mounted.
        if let Some(theme) = store.theme() {
            *palette.write().unwrap() = render_swatches(
                ThemeField::ALL
                    .iter()
                    .map(|f| (*f, Some(theme.get(*f).as_str()))),
            );
        }

        Self {
            store,
            tracker,
            mark,
            palette,
            subscription,
        }
    }

    /// Mark the start of a render cycle; the next published theme closes it.
    pub fn begin_measurement(&self) {
        self.mark.set(self.tracker.clock().now_ms());
    }

    /// Drop a pending mark whose change was never published.
    pub fn cancel_measurement(&self) {
        self.mark.take();
    }

    pub fn palette(&self) -> Vec<Swatch> {
        self.palette.read().unwrap().clone()
    }
}

impl Drop for ContextConsumer {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

impl std::fmt::Debug for ContextConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextConsumer")
            .field("subscription", &self.subscription)
            .finish()
    }
}

/// Consumer that only knows the style surface.
pub struct TokenConsumer {
    document: StyleDocument,
    tracker: BenchmarkTracker,
    mark: RenderMark,
    palette: RwLock<Vec<Swatch>>,
}

impl TokenConsumer {
    pub fn new(document: StyleDocument, tracker: BenchmarkTracker) -> Self {
        Self {
            document,
            tracker,
            mark: RenderMark::default(),
            palette: RwLock::new(Vec::new()),
        }
    }

    pub fn begin_measurement(&self) {
        self.mark.set(self.tracker.clock().now_ms());
    }

    /// Resolve the tokens and render the palette.
    ///
    /// Returns the number of swatches drawn. A missing token node renders an
    /// empty palette.
    pub fn paint(&self) -> usize {
        let css = self
            .document
            .get_element_by_id(THEME_STYLE_ID)
            .map(|node| node.text())
            .unwrap_or_else(|| Arc::from(""));
        let tokens = parse_tokens(&css);
        let swatches = render_swatches(ThemeField::ALL.iter().map(|f| (*f, tokens.get(*f))));
        let drawn = swatches.len();
        *self.palette.write().unwrap() = swatches;

        if let Some(started) = self.mark.take() {
            let elapsed = self.tracker.clock().now_ms() - started;
            self.tracker.record_render(Strategy::Tokens, elapsed);
        }
        drawn
    }

    pub fn palette(&self) -> Vec<Swatch> {
        self.palette.read().unwrap().clone()
    }
}

impl std::fmt::Debug for TokenConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConsumer")
            .field("document", &self.document)
            .finish()
    }
}
