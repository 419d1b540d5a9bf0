//! Groups OpenAPI operations into per-resource CRUD descriptors

use std::collections::HashMap;

use tracing::debug;

use super::pagination::PaginationPolicy;
use super::paths::{extract_path_params, is_list_path, resource_name};
use super::types::{Endpoint, ListEndpoint, ResourceOperations};
use crate::infrastructure::openapi::{
    HttpMethod, OpenApiDocument, Operation, ParameterLocation, SchemaNode,
};

/// Derives resource descriptors from a document.
///
/// Analysis is a pure function of the document and the pagination policy:
/// the same input always yields the same resources, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SpecAnalyzer {
    policy: PaginationPolicy,
}

impl SpecAnalyzer {
    pub fn new(policy: PaginationPolicy) -> Self {
        Self { policy }
    }

    pub fn analyze(&self, document: &OpenApiDocument) -> Vec<ResourceOperations> {
        let mut resources: Vec<ResourceOperations> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for operation in &document.operations {
            let name = resource_name(&operation.path);
            if name.is_empty() {
                debug!(path = %operation.path, "No resource name for path, skipping");
                continue;
            }

            let slot = *index.entry(name.clone()).or_insert_with(|| {
                resources.push(ResourceOperations::new(name.clone()));
                resources.len() - 1
            });
            self.attach(&mut resources[slot], operation);
        }

        resources
    }

    fn attach(&self, resource: &mut ResourceOperations, operation: &Operation) {
        let path_params = extract_path_params(&operation.path);
        let endpoint = |request_schema: Option<SchemaNode>| Endpoint {
            method: operation.method,
            path: operation.path.clone(),
            operation: operation.clone(),
            path_params: path_params.clone(),
            query_params: operation.parameters_in(ParameterLocation::Query),
            request_schema,
        };

        match operation.method {
            HttpMethod::Get if is_list_path(&operation.path) => {
                resource.list = Some(ListEndpoint {
                    is_paginated: self.policy.is_paginated(&operation.parameters),
                    endpoint: endpoint(None),
                });
            }
            HttpMethod::Get if !path_params.is_empty() => {
                resource.get = Some(endpoint(None));
            }
            HttpMethod::Post => resource
                .create
                .push(endpoint(operation.json_request_schema().cloned())),
            HttpMethod::Put => resource
                .update
                .push(endpoint(operation.json_request_schema().cloned())),
            HttpMethod::Delete => resource.delete.push(endpoint(None)),
            _ => {}
        }
    }
}

/// Analyze with the default pagination policy
pub fn analyze_openapi_spec(document: &OpenApiDocument) -> Vec<ResourceOperations> {
    SpecAnalyzer::default().analyze(document)
}

/// Look a resource up by name
pub fn find_resource<'a>(
    resources: &'a [ResourceOperations],
    name: &str,
) -> Option<&'a ResourceOperations> {
    resources.iter().find(|r| r.resource_name == name)
}
