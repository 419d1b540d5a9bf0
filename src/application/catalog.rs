//! Loads the OpenAPI document and exposes its resources

use std::sync::Arc;

use tracing::info;

use super::dto::ResourceSummary;
use super::errors::ApplicationError;
use crate::analysis::{
    Endpoint, OpenApiLoader, ResourceAction, ResourceOperations, SpecAnalyzer, find_resource,
};
use crate::infrastructure::openapi::OpenApiDocument;

/// Source of analyzed resources
pub struct ResourceCatalog {
    loader: Arc<dyn OpenApiLoader>,
    source: String,
    analyzer: SpecAnalyzer,
}

impl ResourceCatalog {
    pub fn new(
        loader: Arc<dyn OpenApiLoader>,
        source: impl Into<String>,
        analyzer: SpecAnalyzer,
    ) -> Self {
        Self {
            loader,
            source: source.into(),
            analyzer,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Load (or reuse) the document and analyze it
    pub async fn load(&self) -> Result<LoadedCatalog, ApplicationError> {
        let document = self.loader.load(&self.source).await?;
        let resources = self.analyzer.analyze(&document);
        info!(
            source = %self.source,
            resources = resources.len(),
            "Analyzed OpenAPI document"
        );
        Ok(LoadedCatalog {
            document,
            resources,
        })
    }
}

/// A document together with its resource descriptors
pub struct LoadedCatalog {
    pub document: Arc<OpenApiDocument>,
    pub resources: Vec<ResourceOperations>,
}

impl LoadedCatalog {
    pub fn resource(&self, name: &str) -> Result<&ResourceOperations, ApplicationError> {
        find_resource(&self.resources, name)
            .ok_or_else(|| ApplicationError::ResourceNotFound(name.to_string()))
    }

    /// Single-item `GET` of `resource`
    pub fn get_endpoint(&self, resource: &str) -> Result<&Endpoint, ApplicationError> {
        self.resource(resource)?
            .get
            .as_ref()
            .ok_or_else(|| ApplicationError::OperationNotFound {
                resource: resource.to_string(),
                action: "get".to_string(),
            })
    }

    /// The `variant`-th endpoint of `action` on `resource`
    pub fn endpoint(
        &self,
        resource: &str,
        action: ResourceAction,
        variant: usize,
    ) -> Result<&Endpoint, ApplicationError> {
        let operations = self.resource(resource)?;
        let endpoints = operations.endpoints(action);
        if endpoints.is_empty() {
            return Err(ApplicationError::OperationNotFound {
                resource: resource.to_string(),
                action: action.to_string(),
            });
        }
        endpoints
            .get(variant)
            .ok_or_else(|| ApplicationError::VariantNotFound {
                resource: resource.to_string(),
                action,
                requested: variant,
                available: endpoints.len(),
            })
    }

    pub fn summaries(&self) -> Vec<ResourceSummary> {
        self.resources.iter().map(ResourceSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SpecError;
    use crate::infrastructure::openapi::OpenApiParser;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticLoader;

    #[async_trait]
    impl OpenApiLoader for StaticLoader {
        async fn load(&self, _source: &str) -> Result<Arc<OpenApiDocument>, SpecError> {
            let document = OpenApiParser::new(json!({
                "openapi": "3.0.1",
                "paths": {
                    "/user": { "get": {}, "post": {} },
                    "/user/{name}": { "get": {}, "put": {} },
                    "/user/{name}/password": { "put": {} },
                    "/health": { "get": {} }
                }
            }))
            .parse()?;
            Ok(Arc::new(document))
        }
    }

    fn catalog() -> ResourceCatalog {
        ResourceCatalog::new(Arc::new(StaticLoader), "memory", SpecAnalyzer::default())
    }

    #[tokio::test]
    async fn test_summaries() {
        let loaded = catalog().load().await.unwrap();
        let summaries = loaded.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "user");
        assert_eq!(summaries[0].display_name, "User");
        assert!(summaries[0].list);
        assert_eq!(summaries[0].update, 2);
    }

    #[tokio::test]
    async fn test_endpoint_lookup_errors() {
        let loaded = catalog().load().await.unwrap();

        let variant = loaded.endpoint("user", ResourceAction::Update, 1).unwrap();
        assert_eq!(variant.path, "/user/{name}/password");

        assert!(matches!(
            loaded.endpoint("vault", ResourceAction::Create, 0),
            Err(ApplicationError::ResourceNotFound(_))
        ));
        assert!(matches!(
            loaded.endpoint("health", ResourceAction::Delete, 0),
            Err(ApplicationError::OperationNotFound { .. })
        ));
        assert!(matches!(
            loaded.endpoint("user", ResourceAction::Create, 3),
            Err(ApplicationError::VariantNotFound { available: 1, .. })
        ));

        assert_eq!(loaded.get_endpoint("user").unwrap().path, "/user/{name}");
        assert!(matches!(
            loaded.get_endpoint("health"),
            Err(ApplicationError::OperationNotFound { action, .. }) if action == "get"
        ));
    }
}
