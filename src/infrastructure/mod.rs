//! Infrastructure layer - backend client and OpenAPI document handling

pub mod api;
pub mod openapi;
