//! Application layer error types

use thiserror::Error;

use crate::analysis::{ResourceAction, SpecError};
use crate::forms::FormError;
use crate::infrastructure::api::ApiError;

/// Application layer errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Resource '{0}' not found")]
    ResourceNotFound(String),

    #[error("Resource '{resource}' has no {action} operation")]
    OperationNotFound {
        resource: String,
        action: String,
    },

    #[error("Resource '{resource}' has {available} {action} variant(s), requested #{requested}")]
    VariantNotFound {
        resource: String,
        action: ResourceAction,
        requested: usize,
        available: usize,
    },

    #[error("OpenAPI error: {0}")]
    Spec(#[from] SpecError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),
}

impl ApplicationError {
    /// The backend wants a (new) session
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ApplicationError::Api(ApiError::AuthRequired))
    }
}
