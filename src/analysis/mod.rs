//! Analysis domain - turns an OpenAPI document into resource descriptors
//!
//! The analyzer groups path/operation entries by inferred resource name into
//! list/get/create/update/delete endpoints. Loading the document itself is
//! abstracted behind [`OpenApiLoader`].

pub mod analyzer;
pub mod errors;
pub mod pagination;
pub mod paths;
pub mod traits;
pub mod types;

pub use analyzer::*;
pub use errors::*;
pub use pagination::*;
pub use traits::*;
pub use types::*;
