//! Error types for chatlite

use thiserror::Error;

/// The main error type for chatlite operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Validation errors (rejected locally, nothing was sent)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote chat service errors
    #[error("Remote error: {0}")]
    Remote(String),
}

/// A specialized Result type for chatlite operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Whether the error was produced by the remote service or its transport
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote(_))
    }
}
