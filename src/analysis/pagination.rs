//! Pagination detection by parameter name
//!
//! The backend publishes no pagination contract, so list endpoints are
//! recognised by the names of their query parameters. The name sets are
//! configurable.

use serde::{Deserialize, Serialize};

use crate::infrastructure::openapi::Parameter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationPolicy {
    /// Names that mark an offset-like parameter
    pub offset_names: Vec<String>,
    /// Names that mark a count-like parameter
    pub count_names: Vec<String>,
    /// Query parameters driven by the pager and hidden from list filters (case-insensitive)
    pub control_names: Vec<String>,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            offset_names: names(&["offset", "page", "skip"]),
            count_names: names(&["count", "limit", "size"]),
            control_names: names(&["offset", "count", "limit", "page", "size", "pagesize"]),
        }
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl PaginationPolicy {
    /// Paginated iff the parameters include both an offset-like and a count-like name
    pub fn is_paginated(&self, parameters: &[Parameter]) -> bool {
        let has = |candidates: &[String]| {
            parameters
                .iter()
                .any(|p| candidates.iter().any(|name| *name == p.name))
        };
        has(&self.offset_names) && has(&self.count_names)
    }

    pub fn is_control_parameter(&self, name: &str) -> bool {
        self.control_names
            .iter()
            .any(|control| control.eq_ignore_ascii_case(name))
    }
}
