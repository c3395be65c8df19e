//! Error types for the auditsweep service.
//!
//! The retrieval core itself is fail-soft and never surfaces these; they
//! cover configuration, I/O, replay sources and the command-line shell.

use std::result;
use thiserror::Error;

/// A specialized Result type for auditsweep operations.
pub type Result<T> = result::Result<T, Error>;

/// The error type for auditsweep operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    /// Invalid data errors
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
