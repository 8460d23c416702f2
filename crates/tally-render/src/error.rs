//! Error types for document rendering.

use thiserror::Error;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The PDF backend failed.
    #[error("pdf error: {0}")]
    Pdf(String),

    /// Writing the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;
