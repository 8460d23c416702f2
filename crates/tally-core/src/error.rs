//! Error types for the invoice domain.

use thiserror::Error;

/// Domain-level errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown invoice status tag.
    #[error("unknown invoice status: {0}")]
    InvalidStatus(String),

    /// Unknown payment gateway tag.
    #[error("unknown payment gateway: {0}")]
    InvalidGateway(String),

    /// Unknown document template name.
    #[error("unknown document template: {0}")]
    InvalidTemplate(String),

    /// Unknown discount/tax mode.
    #[error("unknown adjustment kind: {0}")]
    InvalidAdjustmentKind(String),

    /// Unknown tax base.
    #[error("unknown tax base: {0}")]
    InvalidTaxBase(String),

    /// The invoice is paid and can no longer change.
    #[error("invoice {0} is paid and can no longer be modified")]
    InvoiceLocked(String),

    /// An amount does not fit in a decimal.
    #[error("amount is too large: {0}")]
    Overflow(String),

    /// Records passed together do not belong together.
    #[error("records do not match: {0}")]
    Mismatch(String),

    /// A draft could not be persisted.
    #[error("failed to save draft: {0}")]
    Persistence(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;
