//! REST client for the Elements backend
//!
//! Every call is made relative to the API prefix (`/api/rest` by default).
//! Authenticated calls take an explicit [`SessionContext`]; the client itself
//! holds no credentials.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{Value as JsonValue, json};
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ApiError, normalize_error_payload};
use super::session::{DEFAULT_LEVEL, DEFAULT_USER, SESSION_HEADER, SessionContext, SessionInfo};
use crate::infrastructure::openapi::HttpMethod;
use crate::infrastructure::openapi::format::parse_yaml;

/// `POST` targets that never carry the session header
const PUBLIC_ENDPOINTS: &[&str] = &["/session", "/signup", "/auth/oauth2", "/auth/oidc"];

const SESSION_PATH: &str = "/session";
const VERSION_PATH: &str = "/version";

/// Version reported when the backend cannot be asked
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Whether a request is made without a session
pub fn is_public_endpoint(method: HttpMethod, path: &str) -> bool {
    method == HttpMethod::Post && PUBLIC_ENDPOINTS.contains(&path)
}

/// A request relative to the API prefix
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Concrete path, placeholders already substituted (e.g. `/user/42`)
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub accept: Option<String>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            accept: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn accept(mut self, content_type: impl Into<String>) -> Self {
        self.accept = Some(content_type.into());
        self
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON, or YAML converted to JSON
    Json(JsonValue),
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    fn raw_text(&self) -> String {
        match self {
            ResponseBody::Json(JsonValue::Null) => String::new(),
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.trim().to_string(),
            ResponseBody::Binary(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: ResponseBody,
}

/// Human-readable message of a failed response.
///
/// Tries `message`, `error` and `detail`, then the raw body, then the status line.
pub fn extract_error_message(body: &ResponseBody, status: u16) -> String {
    if let ResponseBody::Json(value) = body {
        let field = ["message", "error", "detail"].iter().find_map(|key| {
            value
                .get(*key)
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
        });
        if let Some(message) = field {
            return message.to_string();
        }
    }

    let raw = body.raw_text();
    if !raw.is_empty() {
        return raw;
    }

    match StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

/// Client for the Elements REST API
#[derive(Debug, Clone)]
pub struct ElementsClient {
    http: Client,
    base_url: Url,
    api_prefix: String,
}

impl ElementsClient {
    pub fn new(
        base_url: Url,
        api_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(http, base_url, api_prefix))
    }

    pub fn with_client(http: Client, base_url: Url, api_prefix: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_prefix: api_prefix.into(),
        }
    }

    /// Underlying HTTP client, shared with the OpenAPI loader
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Absolute URL of `path` under the API prefix
    pub fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.api_prefix.trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Url::parse(&format!("{base}{prefix}{path}"))
            .map_err(|e| ApiError::Validation(format!("Invalid request URL for {path}: {e}")))
    }

    /// Exchange credentials for a session
    pub async fn login(&self, user_id: &str, password: &str) -> Result<SessionContext, ApiError> {
        info!(user = user_id, "Logging in");
        let response = self
            .http
            .post(self.api_url(SESSION_PATH)?)
            .json(&json!({ "userId": user_id, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Login rejected");
            return Err(ApiError::InvalidCredentials);
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Login response is not JSON: {e}")))?;

        let secret = body
            .get("sessionSecret")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidResponse("Login response has no sessionSecret".to_string())
            })?;

        let user = &body["session"]["user"];
        let mut session = SessionContext::new(secret)?.with_user(
            user["name"].as_str().unwrap_or(user_id),
            user["level"].as_str().unwrap_or(DEFAULT_LEVEL),
        );
        if let Some(expiry) = body["session"]["expiry"].as_i64() {
            session = session.with_expiry_millis(expiry);
        }

        info!(user = session.user(), level = session.level(), "Logged in");
        Ok(session)
    }

    /// Check a session with the backend
    pub async fn verify(&self, session: &SessionContext) -> Result<SessionInfo, ApiError> {
        let response = self
            .http
            .post(self.api_url(SESSION_PATH)?)
            .header(SESSION_HEADER, session_header(session)?)
            .json(&json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "Session rejected");
            return Err(ApiError::AuthRequired);
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Session response is not JSON: {e}")))?;
        let user = &body["session"]["user"];

        Ok(SessionInfo {
            username: user["name"].as_str().unwrap_or(DEFAULT_USER).to_string(),
            level: user["level"].as_str().unwrap_or(DEFAULT_LEVEL).to_string(),
            expires_at: body["session"]["expiry"]
                .as_i64()
                .and_then(chrono::DateTime::from_timestamp_millis),
        })
    }

    /// Backend version string; `Unknown` when it cannot be determined
    pub async fn version(&self) -> String {
        match self.send(&ApiRequest::get(VERSION_PATH), None).await {
            Ok(ApiResponse {
                body: ResponseBody::Json(value),
                ..
            }) => version_from_json(value),
            Ok(ApiResponse {
                body: ResponseBody::Text(text),
                ..
            }) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => UNKNOWN_VERSION.to_string(),
            Err(e) => {
                debug!("Version lookup failed: {e}");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    /// Dispatch a request.
    ///
    /// Public endpoints are sent without the session header; anything else
    /// requires a session. The version endpoint is readable without one.
    /// 401 and 403 map to [`ApiError::AuthRequired`] without reading the
    /// body; other failures keep whatever message the body carries.
    pub async fn send(
        &self,
        request: &ApiRequest,
        session: Option<&SessionContext>,
    ) -> Result<ApiResponse, ApiError> {
        let public = is_public_endpoint(request.method, &request.path)
            || (request.method == HttpMethod::Get && request.path == VERSION_PATH);

        let mut url = self.api_url(&request.path)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        debug!(method = %request.method, path = %request.path, "Sending request");
        let mut builder = self.http.request(request.method.into(), url);

        if !public {
            let session = session.ok_or(ApiError::AuthRequired)?;
            builder = builder.header(SESSION_HEADER, session_header(session)?);
        }
        if let Some(accept) = &request.accept {
            builder = builder.header(ACCEPT, accept.as_str());
        }
        if request.method.has_body() {
            let body = request.body.clone().unwrap_or_else(|| json!({}));
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(method = %request.method, path = %request.path, status = status.as_u16(), "Backend rejected session");
            return Err(ApiError::AuthRequired);
        }
        if !status.is_success() {
            let body = decode_error_body(response).await;
            let message = extract_error_message(&body, status.as_u16());
            warn!(method = %request.method, path = %request.path, status = status.as_u16(), "Backend error: {message}");
            let details = body
                .as_json()
                .and_then(|value| normalize_error_payload(value, status.as_u16()).details);
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
                details,
            });
        }

        let body = decode_body(response, content_type.as_deref(), &request.path).await?;
        Ok(ApiResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn version_from_json(value: JsonValue) -> String {
    match value.get("version") {
        Some(JsonValue::String(version)) if !version.is_empty() => return version.clone(),
        Some(version) if !version.is_null() => return version.to_string(),
        _ => {}
    }
    match value {
        JsonValue::String(version) if !version.is_empty() => version,
        JsonValue::Null => UNKNOWN_VERSION.to_string(),
        other => other.to_string(),
    }
}

fn session_header(session: &SessionContext) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(session.expose_secret())
        .map_err(|_| ApiError::Validation("Session secret is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Body of a failed response: JSON when it parses, raw text otherwise
async fn decode_error_body(response: reqwest::Response) -> ResponseBody {
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            debug!("Failed to read error body: {e}");
            return ResponseBody::Text(String::new());
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text),
    }
}

async fn decode_body(
    response: reqwest::Response,
    content_type: Option<&str>,
    path: &str,
) -> Result<ResponseBody, ApiError> {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    let yaml_path = path.ends_with(".yaml") || path.ends_with(".yml");

    if content_type.contains("json") {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ResponseBody::Json(JsonValue::Null));
        }
        return serde_json::from_str(&text)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::InvalidResponse(format!("Invalid JSON response: {e}")));
    }

    if content_type.contains("yaml") || content_type.contains("yml") || yaml_path {
        let text = response.text().await?;
        return parse_yaml(&text)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::InvalidResponse(format!("Invalid YAML response: {e}")));
    }

    if content_type.is_empty() || content_type.starts_with("text/") {
        return Ok(ResponseBody::Text(response.text().await?));
    }

    Ok(ResponseBody::Binary(response.bytes().await?.to_vec()))
}
