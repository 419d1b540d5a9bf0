//! File-based OpenAPI document loader
//!
//! This loader handles only file I/O. The actual parsing is done by the OpenApiParser.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::format::DocumentFormat;
use super::parser::OpenApiParser;
use super::types::OpenApiDocument;
use crate::analysis::{OpenApiLoader, SpecError};

/// Loads OpenAPI documents from local files
pub struct FileOpenApiLoader;

impl FileOpenApiLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<Arc<OpenApiDocument>, SpecError> {
        debug!(source, "Reading OpenAPI document from file");
        let content = fs::read_to_string(source).await?;

        let json = DocumentFormat::detect(source, None).decode(&content)?;
        Ok(Arc::new(OpenApiParser::new(json).parse()?))
    }
}
