use std::io;
use thiserror::Error;

/// Error types for PSK parsing and processing
#[derive(Error, Debug)]
pub enum PskError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed section or record data; decoding aborts with no partial document
    #[error("Format error: {0}")]
    Format(#[from] ue_data::FormatError),

    /// A document invariant does not hold
    #[error("Validation error: {0}")]
    Validation(String),

    /// A document exceeds a hard limit of the wire format
    #[error("Limit exceeded: {0}")]
    Limit(String),
}

/// Result type using PskError
pub type Result<T> = std::result::Result<T, PskError>;
