use thiserror::Error;

use crate::tokens::ThemeField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    /// A color value is not a `#RRGGBB` hex string.
    #[error("invalid {field} format: {value:?}. Expected: #RRGGBB")]
    InvalidColorFormat { field: ThemeField, value: String },

    /// A complete theme was required but a field was absent.
    #[error("missing {0}")]
    MissingField(ThemeField),

    #[error("failed to fetch theme {name:?}: {reason}")]
    FetchFailure { name: String, reason: String },

    #[error("theme store used before initialize()")]
    NotInitialized,
}

impl ThemeError {
    pub fn is_invalid_color(&self) -> bool {
        matches!(self, Self::InvalidColorFormat { .. })
    }
}
