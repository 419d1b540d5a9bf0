//! Use cases for describing and submitting generated forms

use std::sync::Arc;

use tracing::info;

use super::catalog::ResourceCatalog;
use super::dto::{FormRequest, SubmitFormRequest, SubmitFormResponse};
use super::errors::ApplicationError;
use super::get_resource::fetch_record;
use crate::forms::field::display_value;
use crate::forms::{FieldSection, FormModel, FormValues, is_empty_value};
use crate::infrastructure::api::{ApiError, ApiRequest, ElementsClient, SessionContext};
use serde_json::Value as JsonValue;

pub struct FormUseCase {
    catalog: Arc<ResourceCatalog>,
    client: ElementsClient,
}

impl FormUseCase {
    pub fn new(catalog: Arc<ResourceCatalog>, client: ElementsClient) -> Self {
        Self { catalog, client }
    }

    /// Form model of the selected operation.
    ///
    /// `initial` (usually the record being edited) takes precedence over
    /// schema defaults.
    pub async fn describe(
        &self,
        request: &FormRequest,
        initial: Option<&JsonValue>,
    ) -> Result<FormModel, ApplicationError> {
        let catalog = self.catalog.load().await?;
        let endpoint = catalog.endpoint(&request.resource, request.action, request.variant)?;
        Ok(FormModel::for_endpoint(&catalog.document, endpoint, initial))
    }

    /// Fetch the record a form edits through the resource's single-item `GET`.
    ///
    /// Placeholders of the item path are filled from the path values of
    /// `values` (`__path_<name>`).
    pub async fn fetch_initial(
        &self,
        request: &FormRequest,
        values: &FormValues,
        session: Option<&SessionContext>,
    ) -> Result<JsonValue, ApplicationError> {
        let catalog = self.catalog.load().await?;
        let endpoint = catalog.get_endpoint(&request.resource)?;
        let lookup = |name: &str| {
            values
                .get(&FieldSection::Path.key(name))
                .filter(|value| !is_empty_value(Some(value)))
                .map(display_value)
        };

        let fetched =
            fetch_record(&self.client, &request.resource, endpoint, lookup, session).await?;
        match fetched.record {
            Some(record @ JsonValue::Object(_)) => Ok(record),
            _ => Err(ApiError::InvalidResponse(format!(
                "{} did not return a JSON object",
                fetched.path
            ))
            .into()),
        }
    }

    /// Validate the values, then send the operation.
    ///
    /// Nothing is sent when validation fails.
    pub async fn submit(
        &self,
        request: SubmitFormRequest,
        session: Option<&SessionContext>,
    ) -> Result<SubmitFormResponse, ApplicationError> {
        let catalog = self.catalog.load().await?;
        let form = &request.form;
        let endpoint = catalog.endpoint(&form.resource, form.action, form.variant)?;

        let model =
            FormModel::for_endpoint(&catalog.document, endpoint, request.initial.as_ref());
        let submission = model.submit(&request.values)?;
        let path = submission.resolve_path(&endpoint.path)?;

        let mut api_request = ApiRequest::new(endpoint.method, path.clone());
        for (name, value) in submission.query_pairs() {
            api_request = api_request.query(name, value);
        }
        if endpoint.method.has_body() {
            api_request = api_request.json(JsonValue::Object(submission.body));
        }

        info!(resource = %form.resource, action = %form.action, method = %endpoint.method, path = %path, "Submitting form");
        let response = self.client.send(&api_request, session).await?;

        Ok(SubmitFormResponse {
            method: endpoint.method,
            path,
            status: response.status,
            body: response.body.as_json().filter(|v| !v.is_null()).cloned(),
        })
    }
}
