//! Theme value types and the merge rule

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::tokens::{HexColor, ThemeField};
use crate::validate::{validate_color, validate_partial};

/// Complete four-color theme.
///
/// Every field is a validated [`HexColor`], so a `Theme` is always safe to
/// publish or serialize to tokens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    pub background_color: HexColor,
    pub text_color: HexColor,
}

impl Theme {
    /// Build a theme whose text color is derived from the background
    pub fn new(primary: HexColor, secondary: HexColor, background: HexColor) -> Self {
        let text_color = background.contrast_color();
        Self {
            primary_color: primary,
            secondary_color: secondary,
            background_color: background,
            text_color,
        }
    }

    /// Parse a theme from hex strings, deriving the text color.
    pub fn from_hex(primary: &str, secondary: &str, background: &str) -> Result<Self, ThemeError> {
        Ok(Self::new(
            validate_color(ThemeField::PrimaryColor, primary)?,
            validate_color(ThemeField::SecondaryColor, secondary)?,
            validate_color(ThemeField::BackgroundColor, background)?,
        ))
    }

    /// Replace the derived text color with an explicit one
    pub fn with_text_color(mut self, text: HexColor) -> Self {
        self.text_color = text;
        self
    }

    /// Build a complete theme from a partial one.
    ///
    /// Primary, secondary and background colors are required; a missing text
    /// color is derived from the background.
    pub fn from_partial(partial: &PartialTheme) -> Result<Self, ThemeError> {
        let patch = validate_partial(partial)?;
        let require = |value: Option<HexColor>, field| value.ok_or(ThemeError::MissingField(field));
        let primary = require(patch.primary_color, ThemeField::PrimaryColor)?;
        let secondary = require(patch.secondary_color, ThemeField::SecondaryColor)?;
        let background = require(patch.background_color, ThemeField::BackgroundColor)?;
        let text = patch
            .text_color
            .unwrap_or_else(|| background.contrast_color());
        Ok(Self {
            primary_color: primary,
            secondary_color: secondary,
            background_color: background,
            text_color: text,
        })
    }

    /// Get a color by field
    pub fn get(&self, field: ThemeField) -> &HexColor {
        match field {
            ThemeField::PrimaryColor => &self.primary_color,
            ThemeField::SecondaryColor => &self.secondary_color,
            ThemeField::BackgroundColor => &self.background_color,
            ThemeField::TextColor => &self.text_color,
        }
    }

    /// Merge a validated patch onto this theme.
    ///
    /// Absent fields are kept. When the patch carries a background but no
    /// text color, the text color is recomputed from the new background
    /// rather than carried over.
    pub fn merge(&self, patch: &ThemePatch) -> Theme {
        let background = patch
            .background_color
            .clone()
            .unwrap_or_else(|| self.background_color.clone());
        let text = match (&patch.text_color, &patch.background_color) {
            (Some(text), _) => text.clone(),
            (None, Some(bg)) => bg.contrast_color(),
            (None, None) => self.text_color.clone(),
        };
        Theme {
            primary_color: patch
                .primary_color
                .clone()
                .unwrap_or_else(|| self.primary_color.clone()),
            secondary_color: patch
                .secondary_color
                .clone()
                .unwrap_or_else(|| self.secondary_color.clone()),
            background_color: background,
            text_color: text,
        }
    }
}

/// Sparse, unvalidated theme update as delivered by callers or a remote
/// payload. Absent fields are left unchanged by a merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialTheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl PartialTheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(mut self, value: impl Into<String>) -> Self {
        self.primary_color = Some(value.into());
        self
    }

    pub fn secondary(mut self, value: impl Into<String>) -> Self {
        self.secondary_color = Some(value.into());
        self
    }

    pub fn background(mut self, value: impl Into<String>) -> Self {
        self.background_color = Some(value.into());
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.text_color = Some(value.into());
        self
    }

    pub fn get(&self, field: ThemeField) -> Option<&str> {
        match field {
            ThemeField::PrimaryColor => self.primary_color.as_deref(),
            ThemeField::SecondaryColor => self.secondary_color.as_deref(),
            ThemeField::BackgroundColor => self.background_color.as_deref(),
            ThemeField::TextColor => self.text_color.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ThemeField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

impl From<&Theme> for PartialTheme {
    fn from(theme: &Theme) -> Self {
        Self {
            primary_color: Some(theme.primary_color.to_string()),
            secondary_color: Some(theme.secondary_color.to_string()),
            background_color: Some(theme.background_color.to_string()),
            text_color: Some(theme.text_color.to_string()),
        }
    }
}

/// A [`PartialTheme`] whose present fields have all been validated
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThemePatch {
    pub primary_color: Option<HexColor>,
    pub secondary_color: Option<HexColor>,
    pub background_color: Option<HexColor>,
    pub text_color: Option<HexColor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slate() -> Theme {
        Theme::from_hex("#2563eb", "#22c55e", "#0f172a").unwrap()
    }

    fn patch(partial: PartialTheme) -> ThemePatch {
        validate_partial(&partial).unwrap()
    }

    #[test]
    fn new_derives_text_color() {
        assert_eq!(slate().text_color, HexColor::WHITE);
    }

    #[test]
    fn empty_patch_is_identity() {
        let theme = slate();
        assert_eq!(theme.merge(&ThemePatch::default()), theme);
    }

    #[test]
    fn background_only_recomputes_text() {
        let merged = slate().merge(&patch(PartialTheme::new().background("#ffffff")));
        assert_eq!(merged.background_color.as_str(), "#ffffff");
        assert_eq!(merged.text_color, HexColor::BLACK);
        assert_eq!(merged.primary_color.as_str(), "#2563eb");
    }

    #[test]
    fn explicit_text_wins_over_derived() {
        let merged = slate().merge(&patch(
            PartialTheme::new().background("#ffffff").text("#123456"),
        ));
        assert_eq!(merged.text_color.as_str(), "#123456");
    }

    #[test]
    fn text_survives_unrelated_patch() {
        let theme = slate().with_text_color(HexColor::parse("#abcdef").unwrap());
        let merged = theme.merge(&patch(PartialTheme::new().primary("#7c3aed")));
        assert_eq!(merged.text_color.as_str(), "#abcdef");
        assert_eq!(merged.primary_color.as_str(), "#7c3aed");
    }

    #[test]
    fn from_partial_requires_core_fields() {
        let err = Theme::from_partial(&PartialTheme::new().primary("#000000").background("#ffffff"))
            .unwrap_err();
        assert_eq!(err, ThemeError::MissingField(ThemeField::SecondaryColor));

        let theme = Theme::from_partial(&PartialTheme::from(&slate())).unwrap();
        assert_eq!(theme, slate());
    }

    #[test]
    fn serde_uses_camel_case_keys() {
        let json = serde_json::to_value(slate()).unwrap();
        assert_eq!(json["backgroundColor"], "#0f172a");
        assert_eq!(json["textColor"], "#ffffff");

        let partial: PartialTheme = serde_json::from_str(r##"{"primaryColor":"#7c3aed"}"##).unwrap();
        assert_eq!(partial, PartialTheme::new().primary("#7c3aed"));
    }

    #[test]
    fn deserializing_invalid_theme_fails() {
        let raw = r##"{"primaryColor":"red","secondaryColor":"#000000","backgroundColor":"#000000","textColor":"#ffffff"}"##;
        assert!(serde_json::from_str::<Theme>(raw).is_err());
    }
}
