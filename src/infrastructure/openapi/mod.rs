//! OpenAPI document model, parsing and loading

pub mod cached_loader;
pub mod composite_loader;
pub mod file_loader;
pub mod format;
pub mod http_loader;
pub mod parser;
pub mod schema;
pub mod types;

pub use cached_loader::CachedOpenApiLoader;
pub use composite_loader::CompositeOpenApiLoader;
pub use file_loader::FileOpenApiLoader;
pub use format::DocumentFormat;
pub use http_loader::HttpOpenApiLoader;
pub use parser::OpenApiParser;
pub use schema::{
    ArraySchema, MAX_REF_DEPTH, ObjectSchema, PrimitiveSchema, PrimitiveType, Properties,
    SchemaFacets, SchemaNode, SchemaResolver,
};
pub use types::{
    ApiInfo, HttpMethod, MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation,
    RequestBody, Response, Server,
};
