//! Common error types for the roster service

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Common result type for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the record store and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more fields failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error (corrupt row, unexpected state)
    #[error("Internal error: {0}")]
    Internal(String),
}
