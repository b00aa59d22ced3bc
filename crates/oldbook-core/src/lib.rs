//! # oldbook-core
//!
//! Format-independent types shared by the oldbook codecs:
//! - [`CellAddress`], [`SheetCellRef`] and [`CellRange`] - A1-style references
//! - [`adjust`] - Shifting stored ranges when rows or columns move
//! - [`Style`] - Cell formatting (fonts, fills, borders, alignment, number formats)
//! - [`style::date_pattern`] - Rendering date serials through number formats
//!
//! ## Example
//!
//! ```rust
//! use oldbook_core::{CellAddress, CellRange};
//!
//! let addr: CellAddress = "$B$7".parse().unwrap();
//! assert_eq!((addr.row, addr.col), (6, 1));
//! assert!(addr.row_absolute && addr.col_absolute);
//!
//! let range = CellRange::parse("Data!A1:C10").unwrap();
//! assert_eq!(range.to_qualified_string("My Data"), "'My Data'!A1:C10");
//! ```

pub mod adjust;
pub mod cell;
pub mod error;
pub mod style;

pub use adjust::{Adjusted, SheetBounds};
pub use cell::{CellAddress, CellRange, SheetCellRef};
pub use error::{Error, Result};

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DatePatternCache, FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, Palette, PatternType, Protection, Style,
    Underline, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
