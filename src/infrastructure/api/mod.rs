//! Session-aware client for the Elements REST API

pub mod client;
pub mod error;
pub mod session;

pub use client::{
    ApiRequest, ApiResponse, ElementsClient, ResponseBody, UNKNOWN_VERSION, extract_error_message,
    is_public_endpoint,
};
pub use error::{ApiError, ErrorPayload, normalize_error_payload};
pub use session::{SESSION_HEADER, SessionContext, SessionInfo};
