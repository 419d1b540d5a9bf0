//! elements-admin: OpenAPI-driven administration toolkit for an Elements backend
//!
//! The crate loads the backend's OpenAPI document, groups its operations into
//! resources, derives list views and form models from them, and talks to the
//! REST API with an explicit session.
#![deny(unsafe_code)]

pub mod analysis;
pub mod application;
pub mod core;
pub mod forms;
pub mod infrastructure;
pub mod view;

pub use crate::core::{Config, Error, Result};
