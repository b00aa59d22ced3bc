//! Cell styling types
//!
//! This module contains types for cell formatting:
//! - [`Style`] - Complete cell style, as resolved from an extended format
//! - [`FontStyle`] - Font settings
//! - [`FillStyle`] - Background fill
//! - [`BorderStyle`] - Cell borders
//! - [`Alignment`] - Text alignment
//! - [`Color`] and [`Palette`] - Color representation
//! - [`NumberFormat`] - Number formats and the built-in catalog
//!
//! Every stored enumeration carries `from_biff`/`to_biff` conversions backed by a
//! constant table.

mod alignment;
mod border;
mod color;
pub mod date_pattern;
mod fill;
mod font;
mod number_format;

pub use alignment::{Alignment, HorizontalAlignment, ReadingOrder, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle, DiagonalDirection};
pub use color::{
    Color, Palette, DEFAULT_PALETTE, ICV_AUTO, ICV_WINDOW_BACKGROUND, ICV_WINDOW_TEXT,
};
pub use date_pattern::DatePatternCache;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, FontVerticalAlign, Underline};
pub use number_format::{builtin_index, builtin_pattern, NumberFormat, BUILTIN_FORMATS};

/// Complete cell style
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Font settings
    pub font: FontStyle,
    /// Fill/background settings
    pub fill: FillStyle,
    /// Border settings
    pub border: BorderStyle,
    /// Text alignment
    pub alignment: Alignment,
    /// Number format
    pub number_format: NumberFormat,
    /// Cell protection
    pub protection: Protection,
}

impl Style {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Set fill color (solid fill)
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::Solid { color };
        self
    }

    /// Set number format
    pub fn number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }
}

/// Cell protection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Protection {
    /// Cell is locked (protected when sheet is protected)
    pub locked: bool,
    /// Formula is hidden when sheet is protected
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

impl std::hash::Hash for Style {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.font.hash(state);
        self.fill.hash(state);
        self.border.hash(state);
        self.alignment.hash(state);
        self.number_format.hash(state);
        self.protection.hash(state);
    }
}

impl Eq for Style {}
