//! Application layer - orchestrates use cases over the analyzer, forms and client

pub mod catalog;
pub mod dto;
pub mod errors;
pub mod get_resource;
pub mod list_resource;
pub mod submit_form;

pub use catalog::{LoadedCatalog, ResourceCatalog};
pub use dto::*;
pub use errors::*;
pub use get_resource::GetResourceUseCase;
pub use list_resource::ListResourceUseCase;
pub use submit_form::FormUseCase;
