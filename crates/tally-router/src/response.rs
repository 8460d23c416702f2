//! Outgoing API response.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use crate::request::SESSION_COOKIE;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a JSON response.
    pub fn json<T: Serialize>(status: u16, data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::new(status)
                .header("Content-Type", "application/json")
                .body(body),
            Err(e) => {
                tracing::error!("failed to serialize response: {}", e);
                Self::failure(500, "Something went wrong. Please try again.")
            }
        }
    }

    /// Creates a `{ "success": false, "message": ... }` response.
    pub fn failure(status: u16, message: &str) -> Self {
        let body = json!({ "success": false, "message": message }).to_string();
        Self::new(status)
            .header("Content-Type", "application/json")
            .body(body)
    }

    /// Creates an HTML response.
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .header("Content-Type", "text/html; charset=utf-8")
            .body(body.into())
    }

    /// Creates a PDF download.
    pub fn pdf(bytes: Vec<u8>, filename: &str) -> Self {
        Self::ok()
            .header("Content-Type", "application/pdf")
            .header(
                "Content-Disposition",
                format!("inline; filename=\"{}\"", filename.replace('"', "")),
            )
            .body(bytes)
    }

    /// Creates a 401 response.
    pub fn unauthorized() -> Self {
        Self::failure(401, "Please log in to continue.")
    }

    /// Creates a 404 response.
    pub fn not_found() -> Self {
        Self::failure(404, "Not found.")
    }

    /// Creates a 405 response.
    pub fn method_not_allowed() -> Self {
        Self::failure(405, "Method not allowed.")
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key.to_string(), value.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the session cookie.
    #[must_use]
    pub fn with_session(self, key: &str, max_age_secs: i64) -> Self {
        self.header(
            "Set-Cookie",
            format!("{SESSION_COOKIE}={key}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"),
        )
    }

    /// Expires the session cookie.
    #[must_use]
    pub fn clear_session(self) -> Self {
        self.header(
            "Set-Cookie",
            format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
        )
    }

    /// Returns a header value, ignoring case.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response() {
        let res = Response::json(201, &json!({"name": "test"}));
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("content-type"), Some("application/json"));
        assert_eq!(res.body_json().unwrap()["name"], "test");
    }

    #[test]
    fn test_failure_shape() {
        let res = Response::not_found();
        assert_eq!(res.status, 404);
        let body = res.body_json().unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not found.");
    }

    #[test]
    fn test_session_cookie() {
        let res = Response::ok().with_session("abc", 60);
        assert_eq!(
            res.get_header("Set-Cookie"),
            Some("tally_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60")
        );
        let cleared = Response::ok().clear_session();
        assert!(cleared.get_header("set-cookie").unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_pdf_headers() {
        let res = Response::pdf(b"%PDF-1.3".to_vec(), "INV-0001.pdf");
        assert_eq!(res.get_header("Content-Type"), Some("application/pdf"));
        assert_eq!(
            res.get_header("Content-Disposition"),
            Some("inline; filename=\"INV-0001.pdf\"")
        );
    }
}
