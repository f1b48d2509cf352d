//! Error types for the DNS config sync layer
//!
//! Validation failures carry their own typed error ([`ValidationError`]) so
//! callers can tell which pass rejected a configuration.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the sync layer
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration object failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// Settings errors (conflicting source selection, bad flag values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A key of the external representation could not be decoded
    #[error("Failed to parse {key}: {message}")]
    Parse {
        /// Key (ConfigMap data key or file name) that failed
        key: String,
        /// Decoder message
        message: String,
    },

    /// Backend errors (control-plane request failed, watch broke)
    #[error("Config source error ({backend}): {message}")]
    Source {
        /// Backend name
        backend: String,
        /// Error message
        message: String,
    },

    /// The configuration resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The initial fetch did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a settings error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error for a given key
    pub fn parse(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Whether this error came out of the validator
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
