//! Use case for fetching a single record of a resource

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use super::catalog::ResourceCatalog;
use super::dto::{GetResourceRequest, GetResourceResponse};
use super::errors::ApplicationError;
use crate::analysis::Endpoint;
use crate::analysis::paths::substitute_path;
use crate::forms::FormError;
use crate::infrastructure::api::{ApiRequest, ElementsClient, ResponseBody, SessionContext};
use crate::view::DEFAULT_CONTENT_TYPE;

pub struct GetResourceUseCase {
    catalog: Arc<ResourceCatalog>,
    client: ElementsClient,
}

impl GetResourceUseCase {
    pub fn new(catalog: Arc<ResourceCatalog>, client: ElementsClient) -> Self {
        Self { catalog, client }
    }

    pub async fn execute(
        &self,
        request: GetResourceRequest,
        session: Option<&SessionContext>,
    ) -> Result<GetResourceResponse, ApplicationError> {
        let catalog = self.catalog.load().await?;
        let endpoint = catalog.get_endpoint(&request.resource)?;
        let lookup = |name: &str| {
            request
                .path_params
                .iter()
                .find(|(key, value)| key == name && !value.is_empty())
                .map(|(_, value)| value.clone())
        };
        fetch_record(&self.client, &request.resource, endpoint, lookup, session).await
    }
}

/// Send the single-item `GET` of `endpoint` with its placeholders filled by `lookup`
pub(crate) async fn fetch_record<F>(
    client: &ElementsClient,
    resource: &str,
    endpoint: &Endpoint,
    lookup: F,
    session: Option<&SessionContext>,
) -> Result<GetResourceResponse, ApplicationError>
where
    F: Fn(&str) -> Option<String>,
{
    let path =
        substitute_path(&endpoint.path, lookup).map_err(FormError::MissingPathParameter)?;
    let accept = endpoint
        .operation
        .success_response()
        .and_then(|response| response.primary_content_type())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    info!(resource, path = %path, "Fetching record");
    let response = client
        .send(&ApiRequest::get(path.clone()).accept(accept), session)
        .await?;

    let (record, raw) = match response.body {
        ResponseBody::Json(JsonValue::Null) => (None, None),
        ResponseBody::Json(value) => (Some(value), None),
        ResponseBody::Text(text) => (None, Some(text)),
        ResponseBody::Binary(bytes) => {
            let summary = format!("<{} bytes of {accept}>", bytes.len());
            (None, Some(summary))
        }
    };

    Ok(GetResourceResponse {
        resource: resource.to_string(),
        path,
        status: response.status,
        record,
        raw,
    })
}
