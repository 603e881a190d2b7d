//! Statement-level helpers
//!
//! - [`split_queries`] splits a script on semicolons that are not inside a
//!   quoted literal or a comment
//! - [`extract_table_name`] finds the single table behind a simple read so
//!   its result grid can be edited

mod splitter;
mod table_name;

pub use splitter::{is_select_query, sanitize_statement, split_queries};
pub use table_name::extract_table_name;
