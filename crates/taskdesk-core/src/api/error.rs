use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Authentication(String),

    #[error("No token found. Please log in.")]
    NoSession,

    #[error("Unauthorized. Please log in again.")]
    Unauthorized,

    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Malformed session token: {0}")]
    Decode(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Non-empty string field of a structured JSON error body. Other fields may
/// have any shape.
fn body_field(body: &str, field: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Error for a non-success, non-401 response from the gateway.
    ///
    /// Uses the body's `error` field when the body is structured JSON,
    /// otherwise a generic `Error <status>`.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = body_field(body, "error")
            .unwrap_or_else(|| format!("Error {}", status.as_u16()));
        ApiError::Request {
            status: status.as_u16(),
            message,
        }
    }

    /// Error for a rejected call to one of the public auth endpoints.
    ///
    /// Message priority: `error` field, `message` field, raw body text,
    /// then `<fallback> (status N)`.
    pub fn authentication(status: reqwest::StatusCode, body: &str, fallback: &str) -> Self {
        let message = body_field(body, "error")
            .or_else(|| body_field(body, "message"))
            .or_else(|| {
                let raw = body.trim();
                (!raw.is_empty()).then(|| Self::truncate_body(raw))
            })
            .unwrap_or_else(|| format!("{} (status {})", fallback, status.as_u16()));
        ApiError::Authentication(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_uses_error_field() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"Title is required"}"#);
        match err {
            ApiError::Request { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_falls_back_to_generic_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.to_string(), "Error 500");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"nope"}"#);
        assert_eq!(err.to_string(), "Error 404");
    }

    #[test]
    fn test_error_field_survives_odd_sibling_fields() {
        let body = r#"{"error":"Title is required","message":{"field":"title"}}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.to_string(), "Title is required");

        let err = ApiError::authentication(StatusCode::BAD_REQUEST, body, "Login failed");
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_empty_error_field_is_absent() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":""}"#);
        assert_eq!(err.to_string(), "Error 400");

        let err = ApiError::authentication(StatusCode::UNAUTHORIZED, r#"{"error":"","message":"Account locked"}"#, "Login failed");
        assert_eq!(err.to_string(), "Account locked");
    }

    #[test]
    fn test_authentication_message_priority() {
        let status = StatusCode::UNAUTHORIZED;

        let err = ApiError::authentication(status, r#"{"error":"Invalid credentials","message":"m"}"#, "Login failed");
        assert_eq!(err.to_string(), "Invalid credentials");

        let err = ApiError::authentication(status, r#"{"message":"Account locked"}"#, "Login failed");
        assert_eq!(err.to_string(), "Account locked");

        let err = ApiError::authentication(status, "Bad things happened", "Login failed");
        assert_eq!(err.to_string(), "Bad things happened");

        let err = ApiError::authentication(status, "", "Login failed");
        assert_eq!(err.to_string(), "Login failed (status 401)");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
