//! Shared style surface and the token writer
//!
//! [`StyleDocument`] is the headless stand-in for a rendered document: a set
//! of identified style nodes plus attributes on the root element. Token
//! consumers read the theme back out of the node the [`TokenWriter`] owns.
//!
//! Node content is only ever replaced with a single assignment, so a reader
//! racing a write sees either the whole old block or the whole new one.

use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::FxHashMap;

use crate::theme::{PartialTheme, Theme};
use crate::tokens::ThemeField;

/// Well-known id of the node holding the theme tokens
pub const THEME_STYLE_ID: &str = "theme-tokens";

/// Root attribute reflecting whether the default or a custom theme is active
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// An identified style node
#[derive(Debug)]
pub struct StyleNode {
    id: String,
    text: RwLock<Arc<str>>,
}

pub type StyleNodeHandle = Arc<StyleNode>;

impl StyleNode {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            text: RwLock::new(Arc::from("")),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the node's full text content
    pub fn text(&self) -> Arc<str> {
        self.text.read().unwrap().clone()
    }

    /// Replace the node's entire content
    pub fn set_text(&self, text: impl Into<Arc<str>>) {
        *self.text.write().unwrap() = text.into();
    }
}

#[derive(Default)]
struct DocumentInner {
    head: RwLock<Vec<StyleNodeHandle>>,
    root_attributes: RwLock<FxHashMap<String, String>>,
}

/// Headless document: style nodes in the head plus root attributes.
///
/// Cloning yields another handle to the same document.
#[derive(Clone, Default)]
pub struct StyleDocument {
    inner: Arc<DocumentInner>,
}

impl StyleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<StyleNodeHandle> {
        self.inner
            .head
            .read()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    /// Find the node with `id`, appending a new empty one if none exists.
    pub fn ensure_style_node(&self, id: &str) -> StyleNodeHandle {
        let mut head = self.inner.head.write().unwrap();
        if let Some(node) = head.iter().find(|n| n.id == id) {
            return node.clone();
        }
        tracing::debug!("StyleDocument: creating style node #{}", id);
        let node = Arc::new(StyleNode::new(id));
        head.push(node.clone());
        node
    }

    pub fn node_count(&self) -> usize {
        self.inner.head.read().unwrap().len()
    }

    pub fn set_root_attribute(&self, name: &str, value: &str) {
        self.inner
            .root_attributes
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn root_attribute(&self, name: &str) -> Option<String> {
        self.inner.root_attributes.read().unwrap().get(name).cloned()
    }
}

impl std::fmt::Debug for StyleDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleDocument")
            .field("nodes", &self.node_count())
            .finish()
    }
}

/// Serialize a theme as a `:root` block of four custom properties.
pub fn theme_to_css(theme: &Theme) -> String {
    let lines: Vec<String> = ThemeField::ALL
        .iter()
        .map(|f| format!("{}: {};", f.css_var(), theme.get(*f)))
        .collect();
    format!(":root{{\n  {}\n}}", lines.join("\n  "))
}

/// Read theme tokens back out of a token block.
///
/// Unknown properties are ignored; values are returned unvalidated.
pub fn parse_tokens(css: &str) -> PartialTheme {
    let mut partial = PartialTheme::default();
    for line in css.lines() {
        let Some((name, value)) = line.trim().trim_end_matches(';').split_once(':') else {
            continue;
        };
        let value = Some(value.trim().to_string());
        match ThemeField::from_css_var(name.trim()) {
            Some(ThemeField::PrimaryColor) => partial.primary_color = value,
            Some(ThemeField::SecondaryColor) => partial.secondary_color = value,
            Some(ThemeField::BackgroundColor) => partial.background_color = value,
            Some(ThemeField::TextColor) => partial.text_color = value,
            None => {}
        }
    }
    partial
}

/// Owns the single theme-token node on a [`StyleDocument`].
///
/// Without a document every operation is a no-op returning `None`.
#[derive(Debug, Default)]
pub struct TokenWriter {
    document: Option<StyleDocument>,
    node: OnceLock<StyleNodeHandle>,
}

impl TokenWriter {
    pub fn new(document: Option<StyleDocument>) -> Self {
        Self {
            document,
            node: OnceLock::new(),
        }
    }

    /// Writer bound to `document`
    pub fn attached(document: StyleDocument) -> Self {
        Self::new(Some(document))
    }

    /// Writer with no surface to write to
    pub fn detached() -> Self {
        Self::new(None)
    }

    pub fn document(&self) -> Option<&StyleDocument> {
        self.document.as_ref()
    }

    /// The token node, created on first use
    pub fn ensure_node(&self) -> Option<StyleNodeHandle> {
        let document = self.document.as_ref()?;
        Some(
            self.node
                .get_or_init(|| document.ensure_style_node(THEME_STYLE_ID))
                .clone(),
        )
    }

    /// Replace the node's content with `theme`'s tokens in one assignment.
    pub fn write(&self, theme: &Theme) -> Option<StyleNodeHandle> {
        let node = self.ensure_node()?;
        let css = theme_to_css(theme);
        tracing::trace!("TokenWriter::write - {} bytes to #{}", css.len(), node.id());
        node.set_text(css);
        Some(node)
    }

    /// Set the `data-theme` root attribute
    pub fn mark_root(&self, value: &str) {
        if let Some(document) = &self.document {
            document.set_root_attribute(THEME_ATTRIBUTE, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{default_theme, ThemePreset};
    use pretty_assertions::assert_eq;

    #[test]
    fn css_block_layout() {
        assert_eq!(
            theme_to_css(&default_theme()),
            ":root{\n  --primary-color: #2563eb;\n  --secondary-color: #22c55e;\n  --background-color: #0f172a;\n  --text-color: #ffffff;\n}"
        );
    }

    #[test]
    fn parse_round_trips_the_block() {
        let theme = ThemePreset::Solarized.theme();
        let parsed = parse_tokens(&theme_to_css(&theme));
        assert_eq!(Theme::from_partial(&parsed).unwrap(), theme);
    }

    #[test]
    fn parse_ignores_foreign_properties() {
        let parsed = parse_tokens(":root{\n  --accent: #000000;\n  --text-color: #111111;\n}");
        assert_eq!(parsed, PartialTheme::new().text("#111111"));
    }

    #[test]
    fn detached_writer_is_a_noop() {
        let writer = TokenWriter::detached();
        assert!(writer.ensure_node().is_none());
        assert!(writer.write(&default_theme()).is_none());
        writer.mark_root("custom");
    }

    #[test]
    fn ensure_node_is_idempotent() {
        let doc = StyleDocument::new();
        let writer = TokenWriter::attached(doc.clone());
        let a = writer.ensure_node().unwrap();
        let b = writer.ensure_node().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn second_writer_reuses_existing_node() {
        let doc = StyleDocument::new();
        let first = TokenWriter::attached(doc.clone()).ensure_node().unwrap();
        let second = TokenWriter::attached(doc.clone()).ensure_node().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(doc.get_element_by_id(THEME_STYLE_ID).unwrap().id(), THEME_STYLE_ID);
    }

    #[test]
    fn back_to_back_writes_leave_only_the_last() {
        let doc = StyleDocument::new();
        let writer = TokenWriter::attached(doc.clone());
        writer.write(&ThemePreset::Light.theme());
        let node = writer.write(&ThemePreset::Purple.theme()).unwrap();
        assert_eq!(&*node.text(), theme_to_css(&ThemePreset::Purple.theme()));
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn many_writes_never_add_nodes() {
        let doc = StyleDocument::new();
        let writer = TokenWriter::attached(doc.clone());
        for preset in ThemePreset::all().iter().cycle().take(500) {
            writer.write(&preset.theme());
        }
        assert_eq!(doc.node_count(), 1);
    }
}
