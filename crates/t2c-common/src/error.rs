//! Error types for topic2csv.

use thiserror::Error;

/// Result type alias for topic2csv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for topic2csv.
#[derive(Error, Debug)]
pub enum Error {
    // Setup errors (10-19)
    #[error("invalid topic type '{0}': use 'pkg/msg/Type' or 'pkg/Type'")]
    InvalidTopicType(String),

    #[error("setup failed: {0}")]
    Setup(String),

    // Recording errors (20-29)
    #[error("recorder is closed")]
    RecorderClosed,

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the stable diagnostic code for this error type.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidTopicType(_) => 10,
            Error::Setup(_) => 11,
            Error::RecorderClosed => 20,
            Error::Io(_) => 60,
        }
    }
}
