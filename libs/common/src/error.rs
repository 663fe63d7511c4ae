//! Error types shared by the market services

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error type for database setup and connectivity
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while opening the pool
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
