//! Tinct Theme Engine
//!
//! Owns a runtime-mutable four-color theme and propagates it two ways:
//!
//! - **Context**: consumers subscribe to a [`ThemeStore`] and receive every
//!   published [`Theme`].
//! - **Tokens**: the store writes the theme as CSS custom properties into a
//!   single node on a [`StyleDocument`], which token consumers read back.
//!
//! # Quick Start
//!
//! ```rust
//! use tinct_theme::{default_theme, PartialTheme, StyleDocument, ThemeStore, TokenWriter};
//!
//! let document = StyleDocument::new();
//! let store = ThemeStore::with_default(TokenWriter::attached(document.clone()), default_theme());
//!
//! // Only the background changes; the text color is re-derived from it.
//! let theme = store.apply_theme(&PartialTheme::new().background("#ffffff")).unwrap();
//! assert_eq!(theme.text_color.as_str(), "#000000");
//!
//! // Invalid updates are rejected and the previous theme stays active.
//! assert!(store.apply_theme(&PartialTheme::new().primary("red")).is_err());
//! assert_eq!(store.theme(), Some(theme));
//!
//! store.remove_theme().unwrap();
//! assert_eq!(store.theme(), Some(default_theme()));
//! ```
//!
//! # Tokens
//!
//! | Field | Token |
//! | --- | --- |
//! | `primaryColor` | `--primary-color` |
//! | `secondaryColor` | `--secondary-color` |
//! | `backgroundColor` | `--background-color` |
//! | `textColor` | `--text-color` |

pub mod error;
pub mod fetch;
pub mod presets;
pub mod state;
pub mod surface;
pub mod theme;
pub mod tokens;
pub mod validate;

// Re-export commonly used types
pub use error::ThemeError;
pub use fetch::{
    sync_payload, ApplyOrder, LoadOutcome, SimulatedThemeApi, ThemeLoader, ThemeSource,
    DEFAULT_FETCH_DELAY,
};
pub use presets::{default_theme, fallback_payload, ThemePreset};
pub use state::{SubscriptionId, ThemeMode, ThemeStore, TransitionState};
pub use surface::{
    parse_tokens, theme_to_css, StyleDocument, StyleNode, StyleNodeHandle, TokenWriter,
    THEME_ATTRIBUTE, THEME_STYLE_ID,
};
pub use theme::{PartialTheme, Theme, ThemePatch};
pub use tokens::*;
pub use validate::{is_valid_hex_color, validate_color, validate_partial};
