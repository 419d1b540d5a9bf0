//! Tabular presentation of resource lists

pub mod columns;
pub mod resource_view;
pub mod response;

pub use columns::{ColumnPolicy, column_header, display_name, render_cell};
pub use resource_view::{DEFAULT_CONTENT_TYPE, ListPage, ListQuery, ResourceView};
pub use response::{ListResponse, normalize_rows, total_pages};
