//! Error types.

use thiserror::Error;

/// Errors surfaced by the crate.
///
/// The redaction and truncation engine is total apart from JSON encoding, so
/// most of these come from configuration and sink setup.
#[derive(Error, Debug)]
pub enum Error {
    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The log sink could not be installed.
    #[error("Logging error: {message}")]
    Logging { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
