//! Database error types.

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored row violates a model invariant (e.g. a CPF column that no
    /// longer passes validation).
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn invalid_row(what: impl Into<String>) -> Self {
        Self::InvalidRow(what.into())
    }
}

/// Map unique-constraint violations to a conflict on `what`, passing other
/// errors through.
pub(crate) fn map_unique(err: sqlx::Error, what: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DbError::conflict(format!("{} already exists", what))
        }
        _ => DbError::Sqlx(err),
    }
}
