//! OpenAPI document parser
//!
//! Converts a raw JSON tree (YAML documents are converted beforehand) into an
//! [`OpenApiDocument`]. Parsing is best-effort: malformed path items,
//! parameters without a name or location, and unresolvable `$ref`s are
//! skipped rather than failing the whole document. Only a missing
//! `openapi`/`swagger` version is fatal.

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use super::schema::{SchemaNode, resolve_pointer};
use super::types::{
    ApiInfo, HttpMethod, MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation,
    RequestBody, Response, Server,
};
use crate::analysis::SpecError;

/// OpenAPI document parser
pub struct OpenApiParser {
    /// The raw JSON value of the OpenAPI document
    pub json: JsonValue,
}

impl OpenApiParser {
    /// Create a new parser from JSON content
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Parse the document into the typed model
    pub fn parse(self) -> Result<OpenApiDocument, SpecError> {
        let version = self
            .json
            .get("openapi")
            .or_else(|| self.json.get("swagger"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| SpecError::ValidationError("Missing OpenAPI version".to_string()))?
            .to_string();

        let info = ApiInfo {
            title: self.info_str("title").unwrap_or_default(),
            version: self.info_str("version").unwrap_or_default(),
            description: self.info_str("description"),
        };

        let servers = self
            .json
            .get("servers")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|s| {
                        Some(Server {
                            url: s.get("url").and_then(JsonValue::as_str)?.to_string(),
                            description: s
                                .get("description")
                                .and_then(JsonValue::as_str)
                                .map(String::from),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let operations = self.parse_operations();
        debug!("OpenAPI parser found {} operations", operations.len());

        Ok(OpenApiDocument::new(
            version, info, servers, operations, self.json,
        ))
    }

    fn info_str(&self, key: &str) -> Option<String> {
        self.json
            .get("info")?
            .get(key)?
            .as_str()
            .map(String::from)
    }

    /// Every operation of every well-formed path item, in document order
    pub fn parse_operations(&self) -> Vec<Operation> {
        let Some(paths) = self.json.get("paths").and_then(JsonValue::as_object) else {
            warn!("OpenAPI document has no 'paths' object");
            return Vec::new();
        };

        paths
            .iter()
            .filter_map(|(path, path_item)| match path_item.as_object() {
                Some(item) => Some((path, item)),
                None => {
                    debug!(path = %path, "Skipping malformed path item");
                    None
                }
            })
            .flat_map(|(path, path_item)| {
                HttpMethod::all()
                    .iter()
                    .filter_map(|method| {
                        path_item
                            .get(method.as_key())
                            .and_then(JsonValue::as_object)
                            .map(|method_item| (path, *method, path_item, method_item))
                    })
                    .collect::<Vec<_>>()
            })
            .map(|(path, method, path_item, method_item)| {
                self.build_operation(path, method, path_item, method_item)
            })
            .collect()
    }

    fn build_operation(
        &self,
        path: &str,
        method: HttpMethod,
        path_item: &Map<String, JsonValue>,
        method_item: &Map<String, JsonValue>,
    ) -> Operation {
        let id = method_item
            .get("operationId")
            .and_then(JsonValue::as_str)
            .map(String::from)
            .unwrap_or_else(|| {
                format!(
                    "{}_{}",
                    method.as_key(),
                    path.trim_start_matches('/').replace('/', "_")
                )
            });

        // Operation-level parameters override path-level ones with the same name and location
        let mut parameters = self.extract_parameters(path_item);
        for param in self.extract_parameters(method_item) {
            match parameters
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => parameters.push(param),
            }
        }

        let request_body = method_item
            .get("requestBody")
            .and_then(|rb| self.parse_request_body(rb));

        let responses = method_item
            .get("responses")
            .and_then(JsonValue::as_object)
            .map(|map| {
                map.iter()
                    .map(|(status, response)| self.parse_response(status, response))
                    .collect()
            })
            .unwrap_or_default();

        let tags = method_item
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Operation {
            id,
            path: path.to_string(),
            method,
            tags,
            summary: method_item
                .get("summary")
                .and_then(JsonValue::as_str)
                .map(String::from),
            description: method_item
                .get("description")
                .and_then(JsonValue::as_str)
                .map(String::from),
            parameters,
            request_body,
            responses,
            security: method_item
                .get("security")
                .and_then(JsonValue::as_array)
                .cloned(),
            deprecated: method_item
                .get("deprecated")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
        }
    }

    /// Extracts parameters from a path item or operation, resolving `$ref`s
    fn extract_parameters(&self, item: &Map<String, JsonValue>) -> Vec<Parameter> {
        item.get("parameters")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|param| {
                        let param = self.dereference(param)?;
                        let parsed = self.parse_parameter(param);
                        if parsed.is_none() {
                            debug!("Skipping malformed parameter: {param}");
                        }
                        parsed
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_parameter(&self, param: &JsonValue) -> Option<Parameter> {
        let name = param.get("name")?.as_str()?.to_string();
        let location = match param.get("in")?.as_str()? {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "cookie" => ParameterLocation::Cookie,
            _ => return None,
        };

        Some(Parameter {
            name,
            required: param
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(location == ParameterLocation::Path),
            location,
            schema: param
                .get("schema")
                .map(SchemaNode::from_value)
                .unwrap_or_else(|| SchemaNode::from_value(&JsonValue::Null)),
            description: param
                .get("description")
                .and_then(JsonValue::as_str)
                .map(String::from),
        })
    }

    fn parse_request_body(&self, body: &JsonValue) -> Option<RequestBody> {
        let body = self.dereference(body)?;
        Some(RequestBody {
            required: body
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            content: Self::parse_content(body),
            description: body
                .get("description")
                .and_then(JsonValue::as_str)
                .map(String::from),
        })
    }

    fn parse_response(&self, status_code: &str, response: &JsonValue) -> Response {
        let resolved = self.dereference(response);
        Response {
            status_code: status_code.to_string(),
            description: resolved
                .and_then(|r| r.get("description"))
                .and_then(JsonValue::as_str)
                .unwrap_or("No description")
                .to_string(),
            content: resolved.map(Self::parse_content).unwrap_or_default(),
        }
    }

    fn parse_content(container: &JsonValue) -> Vec<MediaType> {
        container
            .get("content")
            .and_then(JsonValue::as_object)
            .map(|content| {
                content
                    .iter()
                    .map(|(media_type, media)| MediaType {
                        media_type: media_type.clone(),
                        schema: media.get("schema").map(SchemaNode::from_value),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Follow a top-level `$ref` on a parameter, body or response object
    fn dereference<'a>(&'a self, value: &'a JsonValue) -> Option<&'a JsonValue> {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(reference) => {
                let resolved = resolve_pointer(&self.json, reference);
                if resolved.is_none() {
                    debug!(reference, "Unable to resolve reference");
                }
                resolved
            }
            None => Some(value),
        }
    }
}
