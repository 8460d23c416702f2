//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route matched the request.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// The path matched, but not for this method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Invalid path pattern.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(String),

    /// Unsupported HTTP method.
    #[error("unsupported method: {0}")]
    InvalidMethod(String),

    /// A path parameter is missing or malformed.
    #[error("invalid path parameter: {0}")]
    InvalidParam(String),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
