//! Column selection and cell rendering for resource tables

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::utils::{humanize_field_name, to_title_case, truncate_chars};

/// Strings longer than this are truncated in table cells
pub const CELL_MAX_CHARS: usize = 50;

/// Placeholder for absent values
pub const EMPTY_CELL: &str = "-";

/// Which row keys become table columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPolicy {
    /// Keys shown first, in this order, when present
    pub priority: Vec<String>,
    pub max_columns: usize,
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        Self {
            priority: ["id", "name", "displayName", "email", "type", "status"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_columns: 6,
        }
    }
}

impl ColumnPolicy {
    /// Scalar keys of the first row: priority keys first, then alphabetical
    pub fn select_columns(&self, rows: &[JsonValue]) -> Vec<String> {
        let Some(JsonValue::Object(first)) = rows.first() else {
            return Vec::new();
        };

        let mut keys: Vec<&String> = first
            .iter()
            .filter(|(_, value)| is_scalar(value))
            .map(|(key, _)| key)
            .collect();

        let rank = |key: &String| self.priority.iter().position(|p| p == key);
        keys.sort_by(|a, b| match (rank(*a), rank(*b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
        });

        keys.into_iter()
            .take(self.max_columns)
            .cloned()
            .collect()
    }
}

fn is_scalar(value: &JsonValue) -> bool {
    !matches!(value, JsonValue::Array(_) | JsonValue::Object(_))
}

/// Text shown in a table cell
pub fn render_cell(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => EMPTY_CELL.to_string(),
        Some(JsonValue::Bool(true)) => "Yes".to_string(),
        Some(JsonValue::Bool(false)) => "No".to_string(),
        Some(JsonValue::String(s)) => truncate_chars(s, CELL_MAX_CHARS),
        Some(other) => truncate_chars(&other.to_string(), CELL_MAX_CHARS),
    }
}

/// Header text of a column key
pub fn column_header(key: &str) -> String {
    humanize_field_name(key)
}

/// Resource name as a title (`smart-contracts` -> `Smart Contracts`)
pub fn display_name(resource_name: &str) -> String {
    to_title_case(resource_name)
}
