//! What a grid cell shows while edits are pending

use serde_json::Value as JsonValue;
use sqlbench_core::{TableColumn, value_to_string};

use super::{CellValue, PendingEdits, PendingInsertion, RowKey};

/// Column metadata that decides placeholder rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnTraits {
    pub is_auto_increment: bool,
    pub has_default: bool,
    pub is_nullable: bool,
}

impl From<&TableColumn> for ColumnTraits {
    fn from(column: &TableColumn) -> Self {
        Self {
            is_auto_increment: column.is_auto_increment,
            has_default: column.has_default(),
            is_nullable: column.is_nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellDisplay {
    Value(JsonValue),
    /// The database will generate this value
    AutoPlaceholder,
    /// The column default will be used
    DefaultPlaceholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCell {
    pub display: CellDisplay,
    /// Whether the user supplied data that differs from what is stored
    pub is_modified: bool,
    pub has_pending_change: bool,
}

/// Placeholder for an empty value, auto-increment first
fn placeholder_for_empty(traits: ColumnTraits) -> Option<CellDisplay> {
    if traits.is_auto_increment {
        Some(CellDisplay::AutoPlaceholder)
    } else if traits.has_default && !traits.is_nullable {
        Some(CellDisplay::DefaultPlaceholder)
    } else {
        None
    }
}

/// Resolve a cell of a pending new row.
///
/// Only non-empty values count as modified. The default marker renders as a
/// placeholder: auto for auto-increment columns, default otherwise.
pub fn resolve_insertion_cell(
    insertion: &PendingInsertion,
    column: &str,
    traits: ColumnTraits,
) -> ResolvedCell {
    let (display, is_modified) = match insertion.value(column) {
        CellValue::Default if traits.is_auto_increment => (CellDisplay::AutoPlaceholder, false),
        CellValue::Default => (CellDisplay::DefaultPlaceholder, false),
        CellValue::Value(value) if sqlbench_core::is_empty_value(&value) => {
            let display = placeholder_for_empty(traits).unwrap_or(CellDisplay::Value(value));
            (display, false)
        }
        CellValue::Value(value) => (CellDisplay::Value(value), true),
    };

    ResolvedCell {
        display,
        is_modified,
        has_pending_change: false,
    }
}

/// Resolve a cell of a fetched row, given its original value
pub fn resolve_existing_cell(
    edits: &PendingEdits,
    key: &RowKey,
    column: &str,
    original: &JsonValue,
    traits: ColumnTraits,
) -> ResolvedCell {
    let Some(pending) = edits.pending_value(key, column) else {
        return ResolvedCell {
            display: CellDisplay::Value(original.clone()),
            is_modified: false,
            has_pending_change: false,
        };
    };

    let (display, is_modified) = match pending {
        CellValue::Default => (CellDisplay::DefaultPlaceholder, true),
        CellValue::Value(value) => {
            let is_modified = value_to_string(value) != value_to_string(original);
            let display = if sqlbench_core::is_empty_value(value) {
                placeholder_for_empty(traits).unwrap_or_else(|| CellDisplay::Value(value.clone()))
            } else {
                CellDisplay::Value(value.clone())
            };
            (display, is_modified)
        }
    };

    ResolvedCell {
        display,
        is_modified,
        has_pending_change: true,
    }
}
