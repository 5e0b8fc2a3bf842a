//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// A missing element is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The store file does not exist.
    #[error("store not found: {0}")]
    NotFound(String),

    /// The file is a database but not an element store.
    #[error("not an element store: {0}")]
    NotAStore(String),

    /// Invalid data read from or written to the store.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
