//! Error types for authentication.

use thiserror::Error;

/// Authentication-specific errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Email and password do not match an account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// An account already uses this email.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Session not found or expired.
    #[error("session not found or expired")]
    SessionNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHashError,

    /// Validation error.
    #[error("{0}")]
    Validation(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
