//! Named query parameters
//!
//! Queries may contain `:name` placeholders. Values are substituted
//! textually before the query is sent, so this is templating rather than
//! prepared-statement binding. The PostgreSQL cast operator `::` never starts
//! a parameter.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use sqlbench_query::parameters::{extract_query_params, interpolate_query_params};
//!
//! let sql = "SELECT * FROM users WHERE id = :id AND created::date = :day";
//! assert_eq!(extract_query_params(sql), vec!["id", "day"]);
//!
//! let values = HashMap::from([("id".to_string(), "5".to_string())]);
//! assert_eq!(
//!     interpolate_query_params(sql, &values),
//!     "SELECT * FROM users WHERE id = 5 AND created::date = :day"
//! );
//! ```

mod extractor;
mod interpolate;

pub use extractor::{ParamOccurrence, extract_query_params, param_occurrences};
pub use interpolate::{ParamValues, interpolate_query_params, missing_query_params};

#[cfg(test)]
mod tests;
