//! Color tokens for theming

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ThemeError;

/// Theme color slots, in declaration order
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum ThemeField {
    PrimaryColor,
    SecondaryColor,
    BackgroundColor,
    TextColor,
}

impl ThemeField {
    pub const ALL: [ThemeField; 4] = [
        ThemeField::PrimaryColor,
        ThemeField::SecondaryColor,
        ThemeField::BackgroundColor,
        ThemeField::TextColor,
    ];

    /// Key used in theme payloads (`primaryColor`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Self::PrimaryColor => "primaryColor",
            Self::SecondaryColor => "secondaryColor",
            Self::BackgroundColor => "backgroundColor",
            Self::TextColor => "textColor",
        }
    }

    /// Custom property exposed on the style surface
    pub fn css_var(self) -> &'static str {
        match self {
            Self::PrimaryColor => "--primary-color",
            Self::SecondaryColor => "--secondary-color",
            Self::BackgroundColor => "--background-color",
            Self::TextColor => "--text-color",
        }
    }

    pub fn from_css_var(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.css_var() == name)
    }
}

impl Display for ThemeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raised when a string is not a `#RRGGBB` color
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {0:?}, expected #RRGGBB")]
pub struct InvalidHex(pub String);

impl InvalidHex {
    /// Attach the theme slot the value was destined for.
    pub fn for_field(self, field: ThemeField) -> ThemeError {
        ThemeError::InvalidColorFormat {
            field,
            value: self.0,
        }
    }
}

/// A validated `#RRGGBB` color.
///
/// Digits are case-insensitive; the spelling the color was parsed from is
/// kept so serialized tokens match caller input exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    text: Cow<'static, str>,
    rgb: [u8; 3],
}

impl HexColor {
    pub const BLACK: HexColor = HexColor {
        text: Cow::Borrowed("#000000"),
        rgb: [0, 0, 0],
    };
    pub const WHITE: HexColor = HexColor {
        text: Cow::Borrowed("#ffffff"),
        rgb: [255, 255, 255],
    };

    /// Build a color from a literal. Invalid literals fail const evaluation.
    pub const fn from_static(text: &'static str) -> HexColor {
        let b = text.as_bytes();
        assert!(b.len() == 7 && b[0] == b'#', "expected #RRGGBB");
        HexColor {
            text: Cow::Borrowed(text),
            rgb: [
                nibble(b[1]) << 4 | nibble(b[2]),
                nibble(b[3]) << 4 | nibble(b[4]),
                nibble(b[5]) << 4 | nibble(b[6]),
            ],
        }
    }

    /// Parse a `#RRGGBB` string
    pub fn parse(value: &str) -> Result<Self, InvalidHex> {
        let rgb = decode(value).ok_or_else(|| InvalidHex(value.to_string()))?;
        Ok(Self {
            text: Cow::Owned(value.to_string()),
            rgb,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 8-bit channels `[r, g, b]`
    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// Same color regardless of digit case
    pub fn same_color(&self, other: &HexColor) -> bool {
        self.rgb == other.rgb
    }

    /// WCAG relative luminance in `[0, 1]`
    pub fn relative_luminance(&self) -> f64 {
        relative_luminance(self.rgb)
    }

    /// Black or white, whichever reads better on top of this color
    pub fn contrast_color(&self) -> HexColor {
        if self.relative_luminance() > 0.5 {
            HexColor::BLACK
        } else {
            HexColor::WHITE
        }
    }
}

impl Display for HexColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for HexColor {
    type Error = InvalidHex;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let rgb = decode(&value).ok_or_else(|| InvalidHex(value.clone()))?;
        Ok(Self {
            text: Cow::Owned(value),
            rgb,
        })
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.text.into_owned()
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("expected hex digit"),
    }
}

fn decode(value: &str) -> Option<[u8; 3]> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Linearize one sRGB channel normalized to `[0, 1]`
fn linearize(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of 8-bit sRGB channels
pub fn relative_luminance([r, g, b]: [u8; 3]) -> f64 {
    let r = linearize(r as f64 / 255.0);
    let g = linearize(g as f64 / 255.0);
    let b = linearize(b as f64 / 255.0);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Best-contrast text color (`#000000` or `#ffffff`) for a background.
///
/// Fails with [`ThemeError::InvalidColorFormat`] when `background` is not a
/// `#RRGGBB` string.
pub fn contrast_color(background: &str) -> Result<HexColor, ThemeError> {
    HexColor::parse(background)
        .map(|c| c.contrast_color())
        .map_err(|e| e.for_field(ThemeField::BackgroundColor))
}
