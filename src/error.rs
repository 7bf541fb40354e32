//! Error types for subfont

use thiserror::Error;

/// Main error type for subfont operations
#[derive(Debug, Error)]
pub enum Error {
    /// IO error (file read/write, memory-map setup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Allocation failure while appending to a string arena
    #[error("out of memory")]
    OutOfMemory,

    /// A font or cache file's magic bytes did not match any known format
    #[error("unrecognized format: {0}")]
    Unrecognized(String),

    /// A bounds check failed while parsing a font or cache file
    #[error("corrupted data: {0}")]
    Corrupted(String),

    /// An external OS call (font registration, shell integration) failed
    #[error("OS error: {0}")]
    Os(String),

    /// Configuration file could not be parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// The pipeline observed the cancel signal and unwound before finishing
    #[error("cancelled")]
    Cancelled,
}

/// Result type alias for subfont operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
