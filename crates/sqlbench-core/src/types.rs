//! Core types for sqlbench

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Pagination metadata reported by the backend for paged reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub total_rows: u64,
}

impl Pagination {
    /// Number of pages needed to show `total_rows`, never less than one
    pub fn page_count(&self) -> u32 {
        if self.page_size == 0 {
            return 1;
        }
        let pages = self.total_rows.div_ceil(u64::from(self.page_size));
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.page_count()
    }
}

/// Result of executing one statement through the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows as JSON values, one entry per column
    pub rows: Vec<Vec<JsonValue>>,
    /// Rows affected (for DML statements)
    pub affected_rows: u64,
    /// Whether the backend cut the result short
    #[serde(default)]
    pub truncated: bool,
    pub pagination: Option<Pagination>,
}

impl QueryResult {
    /// Create a new empty query result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` for the named column
    pub fn value(&self, row: usize, column: &str) -> Option<&JsonValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

/// Whether a cell value counts as "no data" (NULL or the empty string)
pub fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Stringify a value for keying and comparison.
///
/// Strings are used verbatim, everything else uses its JSON text, so `42` and
/// `"42"` compare equal while `null` becomes `"null"`.
pub fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
