use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or no response arrived.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rejected before sending: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The waiter gave up, or the cache went away, before the query settled.
    #[error("Cancelled before the request settled")]
    Cancelled,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            Self::truncate_body(body.trim())
        };
        ApiError::Status { status, message }
    }

    /// Status code of the response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_code_and_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"calories required"}"#);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.to_string(), r#"HTTP 400 Bad Request: {"error":"calories required"}"#);
    }

    #[test]
    fn test_from_status_empty_body_uses_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "HTTP 404 Not Found: Not Found");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total bytes)"));

        // Multi-byte character straddling the cut point
        let mut accented = "a".repeat(MAX_ERROR_BODY_LENGTH - 1);
        accented.push_str("ééé");
        assert!(ApiError::truncate_body(&accented).contains("truncated"));
    }

    #[test]
    fn test_validation_is_not_a_status() {
        let err: ApiError = ValidationError::new("calories", "must not be negative").into();
        assert!(err.status().is_none());
        assert!(!err.is_transport());
    }
}
