//! Error types for the backend API client

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised while talking to the Elements backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// No session, or the backend rejected it (401/403)
    #[error("Authentication required")]
    AuthRequired,

    /// Login was refused
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Backend returned a non-success status
    #[error("Backend error ({status}): {message}")]
    Backend {
        status: u16,
        message: String,
        details: Option<JsonValue>,
    },

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Connection, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request could not be built from the supplied values
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::AuthRequired | ApiError::InvalidCredentials)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("Request timed out: {err}"))
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Error body with the fields the backend may use, flattened to one shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    pub status: u16,
}

/// Normalize a backend error body to `{error, message, details, status}`.
///
/// `details` is taken from `details`, `errors` or `validationErrors`, in that order.
pub fn normalize_error_payload(body: &JsonValue, status: u16) -> ErrorPayload {
    let text = |key: &str| {
        body.get(key)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };
    let message = text("message");

    ErrorPayload {
        error: text("error")
            .or_else(|| message.clone())
            .unwrap_or_else(|| "Request failed".to_string()),
        message,
        details: ["details", "errors", "validationErrors"]
            .iter()
            .filter_map(|key| body.get(*key))
            .find(|value| !value.is_null())
            .cloned(),
        status,
    }
}
