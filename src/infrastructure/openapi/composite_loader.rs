//! Composite OpenAPI loader that picks a strategy from the source

use std::sync::Arc;

use async_trait::async_trait;

use super::file_loader::FileOpenApiLoader;
use super::http_loader::{HttpOpenApiLoader, is_http_source};
use super::types::OpenApiDocument;
use crate::analysis::{OpenApiLoader, SpecError};

/// Dispatches URLs to the HTTP loader and everything else to the file loader
pub struct CompositeOpenApiLoader {
    http: HttpOpenApiLoader,
    file: FileOpenApiLoader,
}

impl CompositeOpenApiLoader {
    pub fn new(http: HttpOpenApiLoader) -> Self {
        Self {
            http,
            file: FileOpenApiLoader::new(),
        }
    }
}

#[async_trait]
impl OpenApiLoader for CompositeOpenApiLoader {
    async fn load(&self, source: &str) -> Result<Arc<OpenApiDocument>, SpecError> {
        tracing::debug!("CompositeOpenApiLoader: Loading from source: {source}");

        if is_http_source(source) {
            tracing::debug!("CompositeOpenApiLoader: Using HTTP loader");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeOpenApiLoader: Using file loader");
            self.file.load(source).await
        }
    }
}
