//! Form error types

use serde::Serialize;
use thiserror::Error;

/// A validation failure attached to one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form key of the field (e.g. `__body_email`)
    pub key: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// One or more fields failed validation; the input is left untouched
    #[error("{} invalid field(s): {}", .0.len(), join(.0))]
    Invalid(Vec<FieldError>),

    #[error("Unknown form field '{0}'")]
    UnknownField(String),

    #[error("Missing path parameter '{0}'")]
    MissingPathParameter(String),
}

impl FormError {
    /// Field-level errors, empty for structural errors
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            FormError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
