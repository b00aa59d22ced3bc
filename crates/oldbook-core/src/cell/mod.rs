//! Cell references
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1", "$B$2")
//! - [`SheetCellRef`] - A cell location qualified by a sheet name
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")

mod address;

pub use address::{
    quote_sheet_name, unquote_sheet_name, CellAddress, CellRange, SheetCellRef,
    ABSOLUTE_MARKER, SHEET_QUALIFIER,
};
