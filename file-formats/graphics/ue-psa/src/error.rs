use std::io;
use thiserror::Error;

/// Error types for PSA parsing and retargeting
#[derive(Error, Debug)]
pub enum PsaError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed section or record data; decoding aborts with no partial document
    #[error("Format error: {0}")]
    Format(#[from] ue_data::FormatError),

    /// A document invariant does not hold
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested sequence does not exist in the document
    #[error("Unknown sequence: '{0}'")]
    UnknownSequence(String),
}

/// Result type using PsaError
pub type Result<T> = std::result::Result<T, PsaError>;
