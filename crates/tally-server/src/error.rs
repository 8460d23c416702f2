//! Errors returned by server actions.

use tally_auth::AuthError;
use tally_core::CoreError;
use tally_forms::{FormError, ValidationErrors};
use tally_render::RenderError;
use tally_router::{Response, RouterError};
use tally_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Message sent for every unexpected failure.
pub const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again.";

/// Action failures, each mapped to an HTTP status.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The input was rejected.
    #[error("{0}")]
    Validation(String),

    /// No valid session, or wrong credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The record does not exist or belongs to someone else.
    #[error("{0}")]
    NotFound(String),

    /// The record's state or references block the action.
    #[error("{0}")]
    Conflict(String),

    /// Anything else. The detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// The message shown to the client.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::Unauthorized(m) | Self::NotFound(m) | Self::Conflict(m) => m,
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }

    pub fn not_found(entity: &str) -> Self {
        let mut chars = entity.chars();
        let entity = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self::NotFound(format!("{entity} not found."))
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => Self::not_found(entity),
            StoreError::Conflict(m) => Self::Conflict(m),
            StoreError::Invalid(m) => Self::Validation(m),
            StoreError::Auth(e) => e.into(),
            StoreError::Core(e) => e.into(),
            e @ (StoreError::Database(_) | StoreError::Corrupt { .. }) => Self::Internal(e.to_string()),
        }
    }
}

impl From<CoreError> for ActionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvoiceLocked(_) => Self::Conflict(err.to_string()),
            CoreError::Persistence(_) | CoreError::Json(_) => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

impl From<AuthError> for ActionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid email or password.".to_string()),
            AuthError::UserNotFound | AuthError::SessionNotFound => {
                Self::Unauthorized("Please log in to continue.".to_string())
            }
            AuthError::EmailTaken => {
                Self::Conflict("An account with this email already exists.".to_string())
            }
            AuthError::Validation(m) => Self::Validation(m),
            AuthError::Database(_) | AuthError::PasswordHashError => Self::Internal(err.to_string()),
        }
    }
}

impl From<FormError> for ActionError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Invalid(errors) => errors.into(),
            FormError::Parse(m) => Self::Validation(format!("Invalid request body: {m}")),
        }
    }
}

impl From<ValidationErrors> for ActionError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.message())
    }
}

impl From<RouterError> for ActionError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::InvalidParam(_) | RouterError::NotFound { .. } => {
                Self::NotFound("Not found.".to_string())
            }
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<RenderError> for ActionError {
    fn from(err: RenderError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ActionError> for Response {
    fn from(err: ActionError) -> Self {
        if let ActionError::Internal(detail) = &err {
            error!(%detail, "action failed");
        }
        Response::failure(err.status(), err.message())
    }
}

/// Result type alias for actions.
pub type Result<T> = std::result::Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_statuses() {
        assert_eq!(ActionError::from(StoreError::NotFound("client")).status(), 404);
        assert_eq!(
            ActionError::from(StoreError::NotFound("client")).message(),
            "Client not found."
        );
        assert_eq!(ActionError::from(StoreError::Conflict("in use".into())).status(), 409);
        assert_eq!(ActionError::from(StoreError::Invalid("no items".into())).status(), 400);
        assert_eq!(ActionError::from(StoreError::Database(sqlx::Error::PoolClosed)).status(), 500);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ActionError::Internal("disk I/O error".to_string());
        let res = Response::from(err);
        assert_eq!(res.status, 500);
        let body = res.body_json().unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required.");
        errors.add("email", "Enter a valid email address.");
        let err = ActionError::from(FormError::Invalid(errors));
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Name is required.; Enter a valid email address.");
    }
}
