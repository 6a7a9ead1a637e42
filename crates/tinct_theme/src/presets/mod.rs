//! Built-in theme presets used by the demo and the benchmark harness.

use crate::theme::{PartialTheme, Theme};
use crate::tokens::HexColor;
use std::fmt::{Display, Formatter};

/// Built-in theme preset catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemePreset {
    Solarized,
    Light,
    Dark,
    Purple,
}

impl ThemePreset {
    /// Stable preset id, also the name a theme is fetched by.
    pub fn id(self) -> &'static str {
        match self {
            Self::Solarized => "solarized",
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Purple => "purple",
        }
    }

    /// User-facing display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Solarized => "Solarized",
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::Purple => "Purple",
        }
    }

    /// Full preset list.
    pub fn all() -> &'static [ThemePreset] {
        const PRESETS: [ThemePreset; 4] = [
            ThemePreset::Solarized,
            ThemePreset::Light,
            ThemePreset::Dark,
            ThemePreset::Purple,
        ];
        &PRESETS
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.id() == id)
    }

    /// The complete palette for this preset.
    pub fn theme(self) -> Theme {
        let palette = match self {
            Self::Solarized => SOLARIZED,
            Self::Light => LIGHT,
            Self::Dark => DARK,
            Self::Purple => PURPLE,
        };
        palette.into_theme()
    }

    /// The preset as a partial update payload
    pub fn payload(self) -> PartialTheme {
        PartialTheme::from(&self.theme())
    }
}

impl Display for ThemePreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Tailwind blue-600 / green-500 on slate-900, white text.
pub fn default_theme() -> Theme {
    Theme::new(
        HexColor::from_static("#2563eb"),
        HexColor::from_static("#22c55e"),
        HexColor::from_static("#0f172a"),
    )
}

/// Payload applied when a fetched theme name is not a preset.
pub fn fallback_payload() -> PartialTheme {
    PartialTheme::new().primary("#7c3aed")
}

struct Palette {
    primary: HexColor,
    secondary: HexColor,
    background: HexColor,
    text: HexColor,
}

impl Palette {
    fn into_theme(self) -> Theme {
        Theme {
            primary_color: self.primary,
            secondary_color: self.secondary,
            background_color: self.background,
            text_color: self.text,
        }
    }
}

const SOLARIZED: Palette = Palette {
    primary: HexColor::from_static("#268bd2"),
    secondary: HexColor::from_static("#2aa198"),
    background: HexColor::from_static("#002b36"),
    text: HexColor::WHITE,
};

const LIGHT: Palette = Palette {
    primary: HexColor::from_static("#1d4ed8"),
    secondary: HexColor::from_static("#059669"),
    background: HexColor::from_static("#ffffff"),
    text: HexColor::BLACK,
};

const DARK: Palette = Palette {
    primary: HexColor::from_static("#3b82f6"),
    secondary: HexColor::from_static("#10b981"),
    background: HexColor::from_static("#0f172a"),
    text: HexColor::WHITE,
};

const PURPLE: Palette = Palette {
    primary: HexColor::from_static("#8b5cf6"),
    secondary: HexColor::from_static("#ec4899"),
    background: HexColor::from_static("#1e1b4b"),
    text: HexColor::WHITE,
};
