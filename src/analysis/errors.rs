//! Error types for loading and analyzing OpenAPI documents

use thiserror::Error;

/// Errors that can occur while loading or parsing an OpenAPI document
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
