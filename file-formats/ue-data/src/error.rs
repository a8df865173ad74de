use std::io;
use thiserror::Error;

/// Error types for section and record decoding
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A section header was cut short at the end of the stream
    #[error("Truncated section header: expected {expected} bytes, found {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    /// The type-flags field of a section header did not match the magic value
    #[error("Invalid type flags in section '{section}': expected {expected}, got {actual}")]
    TypeFlagsMismatch {
        section: String,
        expected: i32,
        actual: i32,
    },

    /// A section declared an element size that does not match the record layout
    #[error("Element size mismatch in section '{section}': expected {expected} bytes, got {actual}")]
    ElementSizeMismatch {
        section: String,
        expected: usize,
        actual: i32,
    },

    /// A fixed-width name could not be encoded in the requested encoding
    #[error("Name error: {0}")]
    Name(String),

    /// Error during parsing
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type using FormatError
pub type Result<T> = std::result::Result<T, FormatError>;
