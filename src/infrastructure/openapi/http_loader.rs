//! HTTP-based OpenAPI document loader

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::format::DocumentFormat;
use super::parser::OpenApiParser;
use super::types::OpenApiDocument;
use crate::analysis::{OpenApiLoader, SpecError};

/// Loads OpenAPI documents from HTTP/HTTPS URLs
pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Result<Self, SpecError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, SpecError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| SpecError::LoadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Reuse an existing client (shared connection pool)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

pub(crate) fn is_http_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<Arc<OpenApiDocument>, SpecError> {
        if !is_http_source(source) {
            return Err(SpecError::LoadError(format!(
                "HttpOpenApiLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        debug!(source, "Fetching OpenAPI document");
        let response = self.client.get(source).send().await.map_err(|e| {
            SpecError::LoadError(format!("Failed to fetch OpenAPI document from {source}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpecError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let content = response
            .text()
            .await
            .map_err(|e| SpecError::LoadError(format!("Failed to read response body: {e}")))?;

        let json = DocumentFormat::detect(source, content_type.as_deref()).decode(&content)?;
        Ok(Arc::new(OpenApiParser::new(json).parse()?))
    }
}
