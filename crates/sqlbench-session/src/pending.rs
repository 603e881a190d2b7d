//! Pending row edits for a table-bound tab
//!
//! Three in-memory maps track edits made in the result grid before they are
//! committed: new rows (keyed by a temporary id), cell changes and deletions
//! of fetched rows (both keyed by the row's stringified primary key). A row
//! is never both changed and deleted.

use serde_json::Value as JsonValue;
use sqlbench_core::{is_empty_value, value_to_string};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

mod payload;
mod resolve;

pub use payload::{filter_insertions_by_indices, insertion_to_payload, validate_insertion};
pub use resolve::{
    CellDisplay, ColumnTraits, ResolvedCell, resolve_existing_cell, resolve_insertion_cell,
};

/// Value of an edited cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Let the database fill in the column default
    Default,
    Value(JsonValue),
}

impl CellValue {
    pub fn null() -> Self {
        CellValue::Value(JsonValue::Null)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, CellValue::Default)
    }

    /// Whether this is an explicit NULL or empty string
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Value(v) if is_empty_value(v))
    }

    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            CellValue::Value(v) => Some(v),
            CellValue::Default => None,
        }
    }
}

impl From<JsonValue> for CellValue {
    fn from(value: JsonValue) -> Self {
        CellValue::Value(value)
    }
}

/// Stringified primary key of a fetched row.
///
/// Single keys use the value's text (`42` and `"42"` are the same row).
/// Composite keys are the JSON array of their parts' text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(String);

impl RowKey {
    pub fn single(value: &JsonValue) -> Self {
        Self(value_to_string(value))
    }

    pub fn composite(values: &[JsonValue]) -> Self {
        let parts = values
            .iter()
            .map(|v| JsonValue::String(value_to_string(v)))
            .collect();
        Self(JsonValue::Array(parts).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Temporary id of a row that does not exist in the database yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempRowId(Uuid);

impl TempRowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TempRowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TempRowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingInsertion {
    pub temp_id: TempRowId,
    pub data: BTreeMap<String, CellValue>,
    /// Where the row renders relative to fetched rows
    pub display_index: usize,
}

impl PendingInsertion {
    /// Stored value for a column; a missing column reads as NULL
    pub fn value(&self, column: &str) -> CellValue {
        self.data.get(column).cloned().unwrap_or_else(CellValue::null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub pk_original: JsonValue,
    pub changes: BTreeMap<String, CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    pub pk_original: JsonValue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingEdits {
    insertions: HashMap<TempRowId, PendingInsertion>,
    changes: HashMap<RowKey, PendingChange>,
    deletions: HashMap<RowKey, PendingDeletion>,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new row after every existing pending row
    pub fn add_insertion(&mut self, data: BTreeMap<String, CellValue>) -> TempRowId {
        let display_index = self
            .insertions
            .values()
            .map(|i| i.display_index + 1)
            .max()
            .unwrap_or(0);
        let temp_id = TempRowId::new();
        self.insertions.insert(
            temp_id,
            PendingInsertion {
                temp_id,
                data,
                display_index,
            },
        );
        temp_id
    }

    pub fn set_insertion_cell(
        &mut self,
        temp_id: TempRowId,
        column: impl Into<String>,
        value: CellValue,
    ) -> bool {
        match self.insertions.get_mut(&temp_id) {
            Some(insertion) => {
                insertion.data.insert(column.into(), value);
                true
            }
            None => false,
        }
    }

    pub fn discard_insertion(&mut self, temp_id: TempRowId) -> Option<PendingInsertion> {
        self.insertions.remove(&temp_id)
    }

    pub fn insertion(&self, temp_id: TempRowId) -> Option<&PendingInsertion> {
        self.insertions.get(&temp_id)
    }

    /// Pending rows in display order
    pub fn insertions(&self) -> Vec<&PendingInsertion> {
        let mut rows: Vec<_> = self.insertions.values().collect();
        rows.sort_by_key(|i| i.display_index);
        rows
    }

    /// Stage a new value for a cell of a fetched row.
    ///
    /// Staging drops a pending deletion of the row. Staging the original
    /// value again removes the cell from the change set.
    pub fn stage_change(
        &mut self,
        key: RowKey,
        pk_original: JsonValue,
        column: impl Into<String>,
        original: &JsonValue,
        value: CellValue,
    ) {
        let column = column.into();
        self.deletions.remove(&key);

        let reverts = value
            .as_value()
            .is_some_and(|v| value_to_string(v) == value_to_string(original));
        if reverts {
            self.revert_cell(&key, &column);
            return;
        }

        self.changes
            .entry(key)
            .or_insert_with(|| PendingChange {
                pk_original,
                changes: BTreeMap::new(),
            })
            .changes
            .insert(column, value);
    }

    /// Drop the pending value of one cell
    pub fn revert_cell(&mut self, key: &RowKey, column: &str) -> bool {
        let Some(change) = self.changes.get_mut(key) else {
            return false;
        };
        let removed = change.changes.remove(column).is_some();
        if change.changes.is_empty() {
            self.changes.remove(key);
        }
        removed
    }

    pub fn change(&self, key: &RowKey) -> Option<&PendingChange> {
        self.changes.get(key)
    }

    pub fn pending_value(&self, key: &RowKey, column: &str) -> Option<&CellValue> {
        self.changes.get(key).and_then(|c| c.changes.get(column))
    }

    pub fn changes(&self) -> impl Iterator<Item = (&RowKey, &PendingChange)> {
        self.changes.iter()
    }

    /// Mark a fetched row for deletion, dropping its pending cell changes
    pub fn mark_deleted(&mut self, key: RowKey, pk_original: JsonValue) {
        self.changes.remove(&key);
        self.deletions.insert(key, PendingDeletion { pk_original });
    }

    pub fn unmark_deleted(&mut self, key: &RowKey) -> bool {
        self.deletions.remove(key).is_some()
    }

    pub fn is_deleted(&self, key: &RowKey) -> bool {
        self.deletions.contains_key(key)
    }

    pub fn deletions(&self) -> impl Iterator<Item = (&RowKey, &PendingDeletion)> {
        self.deletions.iter()
    }

    pub fn insertion_count(&self) -> usize {
        self.insertions.len()
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn deletion_count(&self) -> usize {
        self.deletions.len()
    }

    pub fn clear(&mut self) {
        self.insertions.clear();
        self.changes.clear();
        self.deletions.clear();
    }

    /// Whether anything is waiting to be committed
    pub fn is_dirty(&self) -> bool {
        !self.insertions.is_empty() || !self.changes.is_empty() || !self.deletions.is_empty()
    }
}
