//! Design tokens for theming
//!
//! The theme surface exposes four color tokens, one per [`ThemeField`].

mod color;

pub use color::*;
