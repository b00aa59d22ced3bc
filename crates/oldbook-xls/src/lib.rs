//! # oldbook-xls
//!
//! BIFF8 (.xls) record codec and formatting rationalizer.
//!
//! A workbook stream is read into a [`BiffWorkbook`]: records stay as read,
//! while fonts, number formats and XFs are decoded into a
//! [`FormattingTable`](styles::FormattingTable). [`rationalize`] merges
//! duplicate formatting records and rewrites every stored XF and font
//! reference ([`font_refs`] covers fonts named outside the table);
//! [`sheet`] and [`cond_ranges`] shift stored ranges when rows or columns
//! are inserted or removed.
//!
//! ## Example
//!
//! ```rust
//! use oldbook_xls::{BiffWorkbook, ReadOptions, WriteOptions};
//!
//! let workbook = BiffWorkbook::new();
//! let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
//! let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
//! assert_eq!(read.sheet_names(), vec!["Sheet1"]);
//! ```

pub mod biff;
pub mod cond_ranges;
pub mod error;
pub mod font_refs;
pub mod rationalize;
pub mod reader;
pub mod sheet;
pub mod styles;
pub mod workbook;
pub mod writer;

pub use cond_ranges::LineEdit;
pub use error::{XlsError, XlsResult};
pub use rationalize::{IndexMapping, RationalizeReport, Rationalized};
pub use reader::XlsReader;
pub use sheet::SheetRecords;
pub use workbook::{BiffWorkbook, BoundSheet, GlobalsItem, ReadOptions, WriteOptions};
pub use writer::XlsWriter;
