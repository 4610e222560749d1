//! Application error types.

use domain::{DeliveryError, NotificationError, OrderError, ValidationError};
use storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during application workflows.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed a domain validation rule.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The order lifecycle rejected the requested transition.
    #[error("{0}")]
    InvalidTransition(#[from] OrderError),

    /// The operation requires a state the order is not in.
    #[error("{0}")]
    InvalidState(#[from] DeliveryError),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A uniqueness rule rejected the write.
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// The caller does not own the targeted resource.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Storage error unrelated to any domain rule.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        AppError::Forbidden {
            reason: e.to_string(),
        }
    }
}

/// Convenience type alias for application results.
pub type Result<T> = std::result::Result<T, AppError>;
