//! List view of one resource: request building, loading and table layout

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::columns::{ColumnPolicy, column_header, display_name, render_cell};
use super::response::{ListResponse, total_pages};
use crate::analysis::{PaginationPolicy, ResourceOperations};
use crate::infrastructure::api::{
    ApiError, ApiRequest, ApiResponse, ElementsClient, ResponseBody, SessionContext,
};
use crate::infrastructure::openapi::Parameter;

/// Content type assumed when the operation declares none
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Page and filters requested by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Zero-based page index
    pub page: u64,
    pub page_size: u64,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((name.into(), value.into()));
        self
    }

    /// Row offset of the first item on this page; `None` on overflow
    pub fn offset(&self) -> Option<u64> {
        self.page.checked_mul(self.page_size)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

/// One loaded page, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage {
    pub resource: String,
    pub display_name: String,
    pub content_type: String,
    pub columns: Vec<String>,
    pub rows: Vec<JsonValue>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    /// Raw body when the response is not tabular
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ListPage {
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| column_header(c)).collect()
    }

    /// Rendered cells, one vector per row in column order
    pub fn table(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| render_cell(row.get(column)))
                    .collect()
            })
            .collect()
    }

    /// One-based `(first, last)` row numbers of this page, `None` when the
    /// page is empty or past the end
    pub fn range(&self) -> Option<(u64, u64)> {
        let first = self
            .page
            .saturating_mul(self.page_size)
            .saturating_add(1);
        if first > self.total {
            return None;
        }
        let last = self
            .page
            .saturating_add(1)
            .saturating_mul(self.page_size)
            .min(self.total);
        Some((first, last))
    }
}

/// Presents the list endpoint of a resource
pub struct ResourceView<'a> {
    resource: &'a ResourceOperations,
    pagination: &'a PaginationPolicy,
    columns: &'a ColumnPolicy,
}

impl<'a> ResourceView<'a> {
    pub fn new(
        resource: &'a ResourceOperations,
        pagination: &'a PaginationPolicy,
        columns: &'a ColumnPolicy,
    ) -> Self {
        Self {
            resource,
            pagination,
            columns,
        }
    }

    pub fn display_name(&self) -> String {
        display_name(&self.resource.resource_name)
    }

    /// Query parameters of the list operation the user may filter on
    pub fn filter_params(&self) -> Vec<&'a Parameter> {
        self.resource
            .list
            .as_ref()
            .map(|list| {
                list.endpoint
                    .query_params
                    .iter()
                    .filter(|p| !self.pagination.is_control_parameter(&p.name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First content type of the `200` (else `default`) response
    pub fn response_content_type(&self) -> String {
        self.resource
            .list
            .as_ref()
            .and_then(|list| list.endpoint.operation.success_response())
            .and_then(|response| response.primary_content_type())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string()
    }

    /// Request for one page.
    ///
    /// Fails when the resource has no list operation or the page offset
    /// does not fit in a `u64`.
    pub fn list_request(&self, query: &ListQuery) -> Result<ApiRequest, ApiError> {
        let list = self.resource.list.as_ref().ok_or_else(|| {
            ApiError::Validation(format!(
                "Resource '{}' has no list operation",
                self.resource.resource_name
            ))
        })?;
        let mut request =
            ApiRequest::get(list.endpoint.path.clone()).accept(self.response_content_type());

        if list.is_paginated {
            let offset = query.offset().ok_or_else(|| {
                ApiError::Validation(format!(
                    "Page {} is out of range for page size {}",
                    query.page, query.page_size
                ))
            })?;
            request = request
                .query("offset", offset.to_string())
                .query("count", query.page_size.to_string());
        }
        for (name, value) in &query.filters {
            if value.is_empty() {
                continue;
            }
            if self.pagination.is_control_parameter(name) {
                debug!(name = %name, "Ignoring filter on a pagination parameter");
                continue;
            }
            request = request.query(name.clone(), value.clone());
        }

        Ok(request)
    }

    /// Fetch and normalize one page
    pub async fn load(
        &self,
        client: &ElementsClient,
        session: Option<&SessionContext>,
        query: &ListQuery,
    ) -> Result<ListPage, ApiError> {
        let request = self.list_request(query)?;

        info!(resource = %self.resource.resource_name, page = query.page, "Loading resource list");
        let response = client.send(&request, session).await?;
        Ok(self.page_from_response(&response, query))
    }

    /// Build a page from an already fetched response
    pub fn page_from_response(&self, response: &ApiResponse, query: &ListQuery) -> ListPage {
        let content_type = self.response_content_type();
        let normalized = ListResponse::from_body(&response.body, &content_type);
        let total = normalized.total();
        let columns = self.columns.select_columns(normalized.rows());

        let raw = match normalized {
            ListResponse::Empty => raw_body(&response.body, &content_type),
            _ => None,
        };

        ListPage {
            resource: self.resource.resource_name.clone(),
            display_name: self.display_name(),
            content_type,
            columns,
            rows: normalized.into_rows(),
            total,
            page: query.page,
            page_size: query.page_size,
            total_pages: total_pages(total, query.page_size),
            raw,
        }
    }
}

fn raw_body(body: &ResponseBody, content_type: &str) -> Option<String> {
    match body {
        ResponseBody::Text(text) => Some(text.clone()),
        ResponseBody::Binary(bytes) => Some(format!("<{} bytes of {content_type}>", bytes.len())),
        ResponseBody::Json(JsonValue::Null) => None,
        ResponseBody::Json(value) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_openapi_spec;
    use crate::infrastructure::openapi::{OpenApiDocument, OpenApiParser};
    use serde_json::json;

    fn document() -> OpenApiDocument {
        OpenApiParser::new(json!({
            "openapi": "3.0.1",
            "paths": {
                "/user": {
                    "get": {
                        "parameters": [
                            { "name": "offset", "in": "query" },
                            { "name": "count", "in": "query" },
                            { "name": "search", "in": "query" },
                            { "name": "PageSize", "in": "query" }
                        ],
                        "responses": { "200": { "description": "ok", "content": { "application/json": {} } } }
                    }
                },
                "/health": {
                    "get": {
                        "responses": { "default": { "description": "ok", "content": { "text/plain": {} } } }
                    }
                }
            }
        }))
        .parse()
        .unwrap()
    }

    fn with_view<T>(name: &str, f: impl FnOnce(&ResourceView<'_>) -> T) -> T {
        let resources = analyze_openapi_spec(&document());
        let resource = resources
            .iter()
            .find(|r| r.resource_name == name)
            .unwrap();
        let pagination = PaginationPolicy::default();
        let columns = ColumnPolicy::default();
        f(&ResourceView::new(resource, &pagination, &columns))
    }

    #[test]
    fn test_paginated_request() {
        let request = with_view("user", |view| {
            view.list_request(
                &ListQuery::new(2, 20)
                    .filter("search", "bob")
                    .filter("offset", "999")
                    .filter("empty", ""),
            )
        })
        .unwrap();

        assert_eq!(request.path, "/user");
        assert_eq!(request.accept.as_deref(), Some("application/json"));
        assert_eq!(
            request.query,
            vec![
                ("offset".to_string(), "40".to_string()),
                ("count".to_string(), "20".to_string()),
                ("search".to_string(), "bob".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_offset_overflow_is_rejected() {
        let result = with_view("user", |view| view.list_request(&ListQuery::new(u64::MAX, 20)));
        assert!(matches!(result, Err(ApiError::Validation(_))));

        // Unpaginated endpoints ignore the page
        let request = with_view("health", |view| {
            view.list_request(&ListQuery::new(u64::MAX, 20))
        });
        assert!(request.unwrap().query.is_empty());
    }

    #[test]
    fn test_range_saturates() {
        let page = ListPage {
            resource: "user".to_string(),
            display_name: "User".to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            total: 5,
            page: u64::MAX,
            page_size: 20,
            total_pages: 1,
            raw: None,
        };
        assert_eq!(page.range(), None);
    }

    #[test]
    fn test_filter_params_exclude_controls() {
        let names = with_view("user", |view| {
            view.filter_params()
                .iter()
                .map(|p| p.name.clone())
                .collect::<Vec<_>>()
        });
        assert_eq!(names, vec!["search"]);
    }

    #[test]
    fn test_unpaginated_text_endpoint() {
        with_view("health", |view| {
            assert_eq!(view.response_content_type(), "text/plain");
            let request = view.list_request(&ListQuery::default()).unwrap();
            assert!(request.query.is_empty());

            let response = ApiResponse {
                status: 200,
                content_type: Some("text/plain".to_string()),
                body: ResponseBody::Text("UP".to_string()),
            };
            let page = view.page_from_response(&response, &ListQuery::default());
            assert!(page.rows.is_empty());
            assert_eq!(page.total, 0);
            assert_eq!(page.range(), None);
            assert_eq!(page.raw.as_deref(), Some("UP"));
            assert_eq!(page.display_name, "Health");
        });
    }

    #[test]
    fn test_page_from_paginated_response() {
        with_view("user", |view| {
            let response = ApiResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: ResponseBody::Json(json!({
                    "objects": [
                        { "id": "1", "name": "alice", "active": true, "bio": null },
                        { "id": "2", "name": "bob", "active": false }
                    ],
                    "total": 45
                })),
            };
            let query = ListQuery::new(2, 20);
            let page = view.page_from_response(&response, &query);

            assert_eq!(page.columns, vec!["id", "name", "active", "bio"]);
            assert_eq!(page.headers(), vec!["Id", "Name", "Active", "Bio"]);
            assert_eq!(page.total, 45);
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.range(), Some((41, 45)));
            assert_eq!(page.table()[1], vec!["2", "bob", "No", "-"]);
            assert!(page.raw.is_none());
        });
    }
}
