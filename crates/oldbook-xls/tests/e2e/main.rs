//! E2E tests for the XLS codec: workbook streams are built record by record,
//! read with `BiffWorkbook`, edited, written back and read again.

mod common;
mod reading;
mod writing;

// Re-export common utilities for use in submodules
pub use common::*;
