//! Shared error types for the drover workspace.

use thiserror::Error;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DroverError>;

/// Errors shared across workspace members.
#[derive(Error, Debug)]
pub enum DroverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl DroverError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
