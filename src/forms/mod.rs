//! Form models generated from OpenAPI request schemas

pub mod errors;
pub mod field;
pub mod generator;

pub use errors::{FieldError, FormError};
pub use field::{FieldKind, FieldSection, FormField, LONG_TEXT_THRESHOLD, is_empty_value};
pub use generator::{FormModel, FormSubmission, FormValues, partition_submission};
