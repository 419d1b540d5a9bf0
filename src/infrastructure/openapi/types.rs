//! Typed view over a parsed OpenAPI document

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::schema::SchemaNode;

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Get all HTTP methods as an array
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Head,
            HttpMethod::Options,
        ]
    }

    /// Key of this method inside an OpenAPI path item
    pub fn as_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }

    /// Whether requests with this method carry a body
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key().to_uppercase())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// OpenAPI operation representation
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    /// Unique string used to identify the operation
    #[serde(rename = "operationId")]
    pub id: String,
    /// The path where this operation is defined (e.g., "/user/{id}")
    pub path: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path-level and operation-level parameters, operation-level winning
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: Vec<Response>,
    /// Security requirements declared on the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<JsonValue>>,
    pub deprecated: bool,
}

impl Operation {
    pub fn parameters_in(&self, location: ParameterLocation) -> Vec<Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == location)
            .cloned()
            .collect()
    }

    /// Schema of the `application/json` request body, if any
    pub fn json_request_schema(&self) -> Option<&SchemaNode> {
        self.request_body
            .as_ref()?
            .content
            .iter()
            .find(|m| m.media_type == "application/json")?
            .schema
            .as_ref()
    }

    /// The `200` response, falling back to `default`
    pub fn success_response(&self) -> Option<&Response> {
        self.response("200").or_else(|| self.response("default"))
    }

    pub fn response(&self, status_code: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.status_code == status_code)
    }
}

/// Operation parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// One entry of a `content` map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

/// Request body
#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: Vec<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status_code: String,
    pub description: String,
    pub content: Vec<MediaType>,
}

impl Response {
    /// First declared content type
    pub fn primary_content_type(&self) -> Option<&str> {
        self.content.first().map(|m| m.media_type.as_str())
    }
}

/// API information
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server definition
#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parsed OpenAPI document.
///
/// Keeps the raw JSON tree so `$ref` pointers can be followed after parsing.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    pub version: String,
    pub info: ApiInfo,
    pub servers: Vec<Server>,
    pub operations: Vec<Operation>,
    raw: JsonValue,
}

impl OpenApiDocument {
    pub(crate) fn new(
        version: String,
        info: ApiInfo,
        servers: Vec<Server>,
        operations: Vec<Operation>,
        raw: JsonValue,
    ) -> Self {
        Self {
            version,
            info,
            servers,
            operations,
            raw,
        }
    }

    pub fn raw(&self) -> &JsonValue {
        &self.raw
    }

    /// Follow a local `#/...` reference by literal segment traversal
    pub fn resolve_ref(&self, reference: &str) -> Option<&JsonValue> {
        super::schema::resolve_pointer(&self.raw, reference)
    }

    /// Operations declared on `path`, in method order
    pub fn operations_for(&self, path: &str) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(move |op| op.path == path)
    }
}
