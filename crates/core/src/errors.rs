//! Core error types for twodo.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer,
//! and every variant collapses into one [`ErrorKind`] of the public taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::relationships::{ProcedureCode, ProcedureError, RelationshipError};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Public error taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No authenticated session.
    Unauthorized,
    /// A required field is missing or malformed.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The actor lacks permission.
    Forbidden,
    /// Duplicate relationship or request, or a concurrent ordering change.
    Conflict,
    /// Unclassified backend error, surfaced with its raw message.
    Unknown,
}

/// Root error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Relationship(#[from] RelationshipError),

    #[error("{0}")]
    Procedure(#[from] ProcedureError),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("List changed concurrently, refetch required: {0}")]
    ReconcileRequired(String),

    #[error("Realtime subscription error: {0}")]
    Realtime(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Maps the error into the public taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthorized => ErrorKind::Unauthorized,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Relationship(e) => e.kind(),
            Error::Procedure(e) => e.code.kind(),
            Error::Database(e) => e.kind(),
            Error::ReconcileRequired(_) => ErrorKind::Conflict,
            Error::Realtime(_) | Error::Unexpected(_) => ErrorKind::Unknown,
        }
    }

    /// Shorthand for a procedure failure with an explicit code.
    pub fn procedure(code: ProcedureCode, message: impl Into<String>) -> Self {
        Error::Procedure(ProcedureError::new(code, message))
    }

    pub fn missing_field(field: &str) -> Self {
        Error::Validation(ValidationError::MissingField(field.to_string()))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(message.into()))
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DatabaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::NotFound(_) | DatabaseError::ForeignKeyViolation(_) => {
                ErrorKind::NotFound
            }
            DatabaseError::UniqueViolation(_) => ErrorKind::Conflict,
            _ => ErrorKind::Unknown,
        }
    }
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
