//! Port interfaces for the analysis domain

use async_trait::async_trait;
use std::sync::Arc;

use crate::analysis::SpecError;
use crate::infrastructure::openapi::OpenApiDocument;

/// Loads OpenAPI documents
#[async_trait]
pub trait OpenApiLoader: Send + Sync {
    /// Load an OpenAPI document from a source (file path or URL)
    async fn load(&self, source: &str) -> Result<Arc<OpenApiDocument>, SpecError>;
}
