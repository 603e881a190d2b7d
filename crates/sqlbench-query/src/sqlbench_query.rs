//! sqlbench Query - preparing SQL text before it reaches the backend
//!
//! This crate turns editor text into what is actually sent for execution:
//! statement splitting, single-table detection for editable results,
//! named parameter extraction/interpolation, and page clamping.

mod pagination;
pub mod parameters;
pub mod statements;

pub use pagination::clamp_page;
pub use parameters::{extract_query_params, interpolate_query_params, missing_query_params};
pub use statements::{extract_table_name, is_select_query, sanitize_statement, split_queries};
