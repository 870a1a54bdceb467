//! Common error types for the AIH tracker

use thiserror::Error;

/// Common result type for AIH operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every component
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown record, glosa, professional or glosa type
    #[error("Not found: {0}")]
    NotFound(String),

    /// Registration of a number (or user name) that already exists
    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),

    /// Malformed number, competency, value or other input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected by a status transition policy
    #[error("Conflicting state: {0}")]
    ConflictingState(String),

    /// Bad credentials or unknown caller
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when a database error is a UNIQUE constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(e) => e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false),
            _ => false,
        }
    }
}
