//! The `{ success, message, data }` envelope every action answers with.

use serde::Serialize;
use tally_router::Response;

/// A successful action result.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Serializes the envelope with `status`.
    pub fn respond(&self, status: u16) -> Response {
        Response::json(status, self)
    }
}

impl ActionResponse<()> {
    /// A success without data.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        let body = ActionResponse::ok("Client created.", serde_json::json!({"id": 3}))
            .respond(201)
            .body_json()
            .unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Client created.");
        assert_eq!(body["data"]["id"], 3);

        let body = ActionResponse::done("Client deleted.").respond(200).body_json().unwrap();
        assert!(body.get("data").is_none());
    }
}
