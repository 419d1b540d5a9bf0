//! Resource descriptors derived from an OpenAPI document

use serde::Serialize;

use crate::infrastructure::openapi::{HttpMethod, Operation, Parameter, SchemaNode};

/// One operation attached to a resource
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub operation: Operation,
    /// `{name}` placeholders of `path`, in order
    pub path_params: Vec<String>,
    pub query_params: Vec<Parameter>,
    /// `application/json` request body schema (create/update only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<SchemaNode>,
}

/// The collection endpoint of a resource
#[derive(Debug, Clone, Serialize)]
pub struct ListEndpoint {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    pub is_paginated: bool,
}

/// Kind of mutating action a form can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceAction::Create => write!(f, "create"),
            ResourceAction::Update => write!(f, "update"),
            ResourceAction::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for ResourceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" | "post" => Ok(ResourceAction::Create),
            "update" | "put" => Ok(ResourceAction::Update),
            "delete" => Ok(ResourceAction::Delete),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Operations available for one backend resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceOperations {
    pub resource_name: String,
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<ListEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Endpoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<Endpoint>,
}

impl ResourceOperations {
    pub fn new(resource_name: impl Into<String>) -> Self {
        let resource_name = resource_name.into();
        Self {
            base_path: format!("/{resource_name}"),
            resource_name,
            list: None,
            get: None,
            create: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
        }
    }

    /// Variants registered for `action`, in document order
    pub fn endpoints(&self, action: ResourceAction) -> &[Endpoint] {
        match action {
            ResourceAction::Create => &self.create,
            ResourceAction::Update => &self.update,
            ResourceAction::Delete => &self.delete,
        }
    }

    /// Any operation of the resource, preferring the list operation
    pub fn any_operation(&self) -> Option<&Operation> {
        self.list
            .as_ref()
            .map(|l| &l.endpoint.operation)
            .or_else(|| self.create.first().map(|e| &e.operation))
            .or_else(|| self.update.first().map(|e| &e.operation))
            .or_else(|| self.delete.first().map(|e| &e.operation))
    }
}
