//! Error handling for the elements-admin library.
//!
//! This module defines the crate-level error type `Error`, along with a
//! convenient `Result` alias. Layer-specific errors (spec loading, API calls,
//! form validation) convert into it through `#[from]`.
//!
//! # Examples
//!
//! ```
//! use elements_admin::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("page_size must be greater than zero"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

/// Result type for elements-admin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for elements-admin operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// OpenAPI document error
    #[error("OpenAPI error: {0}")]
    Spec(#[from] crate::analysis::SpecError),

    /// Backend API error
    #[error("API error: {0}")]
    Api(#[from] crate::infrastructure::api::ApiError),

    /// Form validation error
    #[error("Form error: {0}")]
    Form(#[from] crate::forms::FormError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_config_creation() {
        let error = Error::config("Invalid configuration");
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_error_from_str() {
        let error: Error = "Test error message".into();
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: Test error message");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("File not found"));
    }

    #[test]
    fn test_error_from_api_error() {
        let error: Error = crate::infrastructure::api::ApiError::AuthRequired.into();
        assert!(matches!(error, Error::Api(_)));
        assert!(error.to_string().starts_with("API error:"));
    }

    #[test]
    fn test_error_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error: Error = toml_error.into();
        assert!(matches!(error, Error::Toml(_)));
    }
}
