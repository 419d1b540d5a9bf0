//! Memoizing loader
//!
//! The document is fetched once per source and shared by every consumer
//! until explicitly invalidated.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::OpenApiDocument;
use crate::analysis::{OpenApiLoader, SpecError};

pub struct CachedOpenApiLoader<L> {
    inner: L,
    cache: RwLock<HashMap<String, Arc<OpenApiDocument>>>,
}

impl<L: OpenApiLoader> CachedOpenApiLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop the cached document for `source`; the next load refetches it
    pub async fn invalidate(&self, source: &str) {
        self.cache.write().await.remove(source);
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}

#[async_trait]
impl<L: OpenApiLoader> OpenApiLoader for CachedOpenApiLoader<L> {
    async fn load(&self, source: &str) -> Result<Arc<OpenApiDocument>, SpecError> {
        if let Some(document) = self.cache.read().await.get(source) {
            debug!(source, "OpenAPI document served from cache");
            return Ok(Arc::clone(document));
        }

        let document = self.inner.load(source).await?;
        self.cache
            .write()
            .await
            .insert(source.to_string(), Arc::clone(&document));
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::openapi::OpenApiParser;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OpenApiLoader for CountingLoader {
        async fn load(&self, _source: &str) -> Result<Arc<OpenApiDocument>, SpecError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(
                OpenApiParser::new(json!({ "openapi": "3.0.1" })).parse()?,
            ))
        }
    }

    #[tokio::test]
    async fn test_loads_once_per_source() {
        let loader = CachedOpenApiLoader::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });

        let first = loader.load("a").await.unwrap();
        let second = loader.load("a").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.inner.calls.load(Ordering::SeqCst), 1);

        loader.load("b").await.unwrap();
        assert_eq!(loader.inner.calls.load(Ordering::SeqCst), 2);

        loader.invalidate("a").await;
        loader.load("a").await.unwrap();
        assert_eq!(loader.inner.calls.load(Ordering::SeqCst), 3);
    }
}
