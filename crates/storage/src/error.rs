use thiserror::Error;

use uuid::Uuid;

/// Errors that can occur when interacting with a repository.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness constraint was violated on insert.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: &'static str },

    /// The row to update does not exist.
    #[error("Row not found: {entity} {id}")]
    RowNotFound { entity: &'static str, id: Uuid },

    /// The backing store could not be reached.
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;
