//! Normalization of list responses into table rows

use serde_json::Value as JsonValue;

use crate::infrastructure::api::ResponseBody;

/// Shape of a list response body
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse {
    /// A bare JSON array
    Array(Vec<JsonValue>),
    /// An object wrapping rows in `content` or `objects`
    Paginated {
        items: Vec<JsonValue>,
        total: Option<u64>,
    },
    /// Any other object, shown as a single row
    Single(JsonValue),
    /// `null`, scalars and non-JSON bodies
    Empty,
}

impl ListResponse {
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => ListResponse::Array(items.clone()),
            JsonValue::Object(map) => {
                let wrapped = ["content", "objects"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(JsonValue::as_array));
                match wrapped {
                    Some(items) => ListResponse::Paginated {
                        items: items.clone(),
                        total: map.get("total").and_then(positive_count),
                    },
                    None => ListResponse::Single(value.clone()),
                }
            }
            _ => ListResponse::Empty,
        }
    }

    /// Normalize a decoded body; only JSON is tabular when JSON was expected
    pub fn from_body(body: &ResponseBody, expected_content_type: &str) -> Self {
        match body {
            ResponseBody::Json(value) if expected_content_type.contains("json") => {
                Self::from_json(value)
            }
            _ => ListResponse::Empty,
        }
    }

    pub fn rows(&self) -> &[JsonValue] {
        match self {
            ListResponse::Array(items) | ListResponse::Paginated { items, .. } => items,
            ListResponse::Single(row) => std::slice::from_ref(row),
            ListResponse::Empty => &[],
        }
    }

    pub fn into_rows(self) -> Vec<JsonValue> {
        match self {
            ListResponse::Array(items) | ListResponse::Paginated { items, .. } => items,
            ListResponse::Single(row) => vec![row],
            ListResponse::Empty => Vec::new(),
        }
    }

    /// Reported `total` when positive, else the number of rows
    pub fn total(&self) -> u64 {
        match self {
            ListResponse::Paginated {
                total: Some(total), ..
            } => *total,
            other => other.rows().len() as u64,
        }
    }
}

fn positive_count(value: &JsonValue) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|n| n.is_finite() && *n > 0.0).map(|n| n as u64))
        .filter(|n| *n > 0)
}

/// Rows of any JSON response
pub fn normalize_rows(value: &JsonValue) -> Vec<JsonValue> {
    ListResponse::from_json(value).into_rows()
}

/// Number of pages needed for `total` rows
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalization_shapes() {
        assert_eq!(normalize_rows(&json!([{ "id": 1 }, { "id": 2 }])).len(), 2);
        assert_eq!(
            normalize_rows(&json!({ "content": [{ "id": 1 }], "total": 9 })),
            vec![json!({ "id": 1 })]
        );
        assert_eq!(
            normalize_rows(&json!({ "objects": [{ "id": 1 }, { "id": 2 }] })).len(),
            2
        );
        assert_eq!(
            normalize_rows(&json!({ "status": "UP" })),
            vec![json!({ "status": "UP" })]
        );
        assert!(normalize_rows(&json!(null)).is_empty());
        assert!(normalize_rows(&json!("text")).is_empty());
        assert!(normalize_rows(&json!(42)).is_empty());
    }

    #[test]
    fn test_content_that_is_not_an_array_is_a_single_row() {
        let response = ListResponse::from_json(&json!({ "content": "inline", "objects": null }));
        assert!(matches!(response, ListResponse::Single(_)));
    }

    #[test]
    fn test_totals() {
        let paged = ListResponse::from_json(&json!({ "objects": [{}, {}], "total": 45 }));
        assert_eq!(paged.total(), 45);
        let zero = ListResponse::from_json(&json!({ "objects": [{}, {}], "total": 0 }));
        assert_eq!(zero.total(), 2);
        let bare = ListResponse::from_json(&json!([{}, {}, {}]));
        assert_eq!(bare.total(), 3);

        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn test_non_json_bodies_have_no_rows() {
        let text = ResponseBody::Text("plain".to_string());
        assert_eq!(ListResponse::from_body(&text, "text/plain"), ListResponse::Empty);

        let json_body = ResponseBody::Json(json!([{ "id": 1 }]));
        assert_eq!(
            ListResponse::from_body(&json_body, "application/octet-stream"),
            ListResponse::Empty
        );
        assert_eq!(ListResponse::from_body(&json_body, "application/json").rows().len(), 1);
    }
}
