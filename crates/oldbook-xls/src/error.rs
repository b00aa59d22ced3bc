//! XLS error types

use thiserror::Error;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur during XLS reading/writing
#[derive(Debug, Error)]
pub enum XlsError {
    /// IO error (also covers CFB errors which use std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format
    #[error("Invalid XLS format: {0}")]
    InvalidFormat(String),

    /// Unsupported version
    #[error("Unsupported XLS version: {0}")]
    UnsupportedVersion(String),

    /// Parse error inside a record payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// A record header promises more payload than the stream holds
    #[error(
        "Malformed record 0x{record_type:04X} at offset {offset}: \
         declared {declared} bytes, {available} available"
    )]
    MalformedRecord {
        offset: u64,
        record_type: u16,
        declared: usize,
        available: usize,
    },

    /// No custom number format index is left below the format ceiling
    #[error("Too many custom number formats (ceiling 0x{ceiling:03X})")]
    TooManyCustomFormats { ceiling: u16 },

    /// The extended format table is full
    #[error("Too many cell styles (limit {limit})")]
    TooManyCustomStyles { limit: usize },

    /// No table entry owns the index
    #[error("No {kind} with index {index}")]
    NotFound { kind: &'static str, index: u16 },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] oldbook_core::Error),
}
