//! Error types for persistence.

use tally_core::CoreError;
use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The record does not exist or belongs to another user.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The operation is blocked by the state of related records.
    #[error("{0}")]
    Conflict(String),

    /// The operation is not valid for the record's current content.
    #[error("{0}")]
    Invalid(String),

    /// A stored row no longer decodes.
    #[error("corrupt {entity} {id}: {reason}")]
    Corrupt {
        entity: &'static str,
        id: i64,
        reason: String,
    },

    /// Authentication error.
    #[error(transparent)]
    Auth(#[from] tally_auth::AuthError),

    /// Domain error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    pub(crate) fn corrupt(entity: &'static str, id: i64, reason: impl ToString) -> Self {
        Self::Corrupt {
            entity,
            id,
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
