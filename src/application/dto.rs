//! Data Transfer Objects for application layer

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::analysis::{ResourceAction, ResourceOperations};
use crate::forms::FormValues;
use crate::infrastructure::openapi::HttpMethod;
use crate::view::display_name;

/// One line of the resource catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSummary {
    pub name: String,
    pub display_name: String,
    pub base_path: String,
    pub list: bool,
    pub paginated: bool,
    pub get: bool,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl From<&ResourceOperations> for ResourceSummary {
    fn from(resource: &ResourceOperations) -> Self {
        Self {
            name: resource.resource_name.clone(),
            display_name: display_name(&resource.resource_name),
            base_path: resource.base_path.clone(),
            list: resource.list.is_some(),
            paginated: resource.list.as_ref().is_some_and(|l| l.is_paginated),
            get: resource.get.is_some(),
            create: resource.create.len(),
            update: resource.update.len(),
            delete: resource.delete.len(),
        }
    }
}

/// Request to load one page of a resource list
#[derive(Debug, Clone, PartialEq)]
pub struct ListResourceRequest {
    pub resource: String,
    /// Zero-based page index
    pub page: u64,
    pub filters: Vec<(String, String)>,
}

/// Request to fetch one record through the resource's single-item `GET`
#[derive(Debug, Clone, PartialEq)]
pub struct GetResourceRequest {
    pub resource: String,
    /// Values for the `{name}` placeholders of the item path
    pub path_params: Vec<(String, String)>,
}

/// A fetched record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetResourceResponse {
    pub resource: String,
    pub path: String,
    pub status: u16,
    /// JSON body, absent when the backend returned nothing or non-JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Selects one mutating operation of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub resource: String,
    pub action: ResourceAction,
    /// Index into the action's variants, in document order
    pub variant: usize,
}

/// Request to validate and send a form
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitFormRequest {
    pub form: FormRequest,
    pub values: FormValues,
    /// Existing record the form starts from, keyed by plain field name
    pub initial: Option<JsonValue>,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitFormResponse {
    pub method: HttpMethod,
    pub path: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}
