//! FORMAT record (0x041E).
//!
//! Layout:
//!   0  u16  ifmt   format index
//!   2  ...  format string (unicode string, 2-byte length prefix)

use crate::biff::parser::read_u16;
use crate::biff::strings::{read_unicode_string_flagged, write_unicode_string};
use crate::error::XlsResult;

/// First index available to workbook-defined number formats.
pub const FIRST_CUSTOM_FORMAT: u16 = 0xA4;

/// Highest index a workbook-defined number format may use.
pub const MAX_CUSTOM_FORMAT: u16 = 0x1B9;

/// A number format pattern as stored in a FORMAT record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatRecord {
    pub pattern: String,
    /// Pattern was stored as UTF-16 rather than compressed
    pub wide: bool,
}

impl FormatRecord {
    pub fn new<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
            wide: false,
        }
    }

    /// Decode a FORMAT record into its index and pattern.
    pub fn parse(data: &[u8], encoding: &str) -> XlsResult<(u16, Self)> {
        let mut off = 0;
        let index = read_u16(data, &mut off)?;
        let (pattern, wide) = read_unicode_string_flagged(data, &mut off, encoding)?;
        Ok((index, Self { pattern, wide }))
    }

    pub fn encode(&self, index: u16, encoding: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.pattern.len() * 2);
        out.extend_from_slice(&index.to_le_bytes());
        write_unicode_string(&mut out, &self.pattern, self.wide, encoding);
        out
    }
}

/// Whether `index` lies in the workbook-defined range.
pub fn is_custom(index: u16) -> bool {
    index >= FIRST_CUSTOM_FORMAT
}
