//! Color validation
//!
//! Validation is pure: it never touches the style surface or store state, so
//! it can run before anything is written or published.

use crate::error::ThemeError;
use crate::theme::{PartialTheme, ThemePatch};
use crate::tokens::{HexColor, ThemeField};

/// `true` for `#RRGGBB` strings (hex digits in either case)
pub fn is_valid_hex_color(value: &str) -> bool {
    HexColor::parse(value).is_ok()
}

/// Validate one color destined for `field`
pub fn validate_color(field: ThemeField, value: &str) -> Result<HexColor, ThemeError> {
    HexColor::parse(value).map_err(|e| e.for_field(field))
}

/// Validate every present field of a partial update.
///
/// Fields are checked in [`ThemeField::ALL`] order and the first bad one is
/// reported. A present but empty value counts as present and is rejected.
pub fn validate_partial(partial: &PartialTheme) -> Result<ThemePatch, ThemeError> {
    let check = |field: ThemeField| -> Result<Option<HexColor>, ThemeError> {
        partial
            .get(field)
            .map(|value| validate_color(field, value))
            .transpose()
    };

    Ok(ThemePatch {
        primary_color: check(ThemeField::PrimaryColor)?,
        secondary_color: check(ThemeField::SecondaryColor)?,
        background_color: check(ThemeField::BackgroundColor)?,
        text_color: check(ThemeField::TextColor)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_check() {
        assert!(is_valid_hex_color("#A1b2C3"));
        assert!(!is_valid_hex_color("#A1b2C"));
        assert!(!is_valid_hex_color("rgb(0,0,0)"));
    }

    #[test]
    fn names_offending_field_and_value() {
        let err = validate_partial(&PartialTheme::new().primary("#000000").background("navy"))
            .unwrap_err();
        assert_eq!(
            err,
            ThemeError::InvalidColorFormat {
                field: ThemeField::BackgroundColor,
                value: "navy".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid backgroundColor format: \"navy\". Expected: #RRGGBB"
        );
    }

    #[test]
    fn first_bad_field_in_order_is_reported() {
        let err = validate_partial(&PartialTheme::new().text("x").primary("y")).unwrap_err();
        assert!(matches!(
            err,
            ThemeError::InvalidColorFormat {
                field: ThemeField::PrimaryColor,
                ..
            }
        ));
    }

    #[test]
    fn empty_string_is_rejected() {
        assert!(validate_partial(&PartialTheme::new().secondary("")).is_err());
    }

    #[test]
    fn absent_fields_stay_absent() {
        let patch = validate_partial(&PartialTheme::new().text("#FFFFFF")).unwrap();
        assert!(patch.primary_color.is_none());
        assert!(patch.background_color.is_none());
        assert_eq!(patch.text_color.unwrap().as_str(), "#FFFFFF");
    }
}
