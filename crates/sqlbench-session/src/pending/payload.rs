//! Turning pending rows into backend calls

use sqlbench_core::{RowPayload, TableColumn};
use std::collections::{BTreeMap, BTreeSet};

use super::{CellValue, PendingInsertion};

/// Check a pending row against the table's required columns.
///
/// A column is required when it is not nullable, has no default and is not
/// auto-increment. Returns column name to reason; empty means valid.
pub fn validate_insertion(
    insertion: &PendingInsertion,
    columns: &[TableColumn],
) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    for column in columns.iter().filter(|c| c.is_required()) {
        let reason = match insertion.data.get(&column.name) {
            None => Some(format!("{} is required", column.name)),
            Some(value) if value.is_empty() => Some(format!("{} is required", column.name)),
            Some(CellValue::Default) => Some(format!("{} has no default value", column.name)),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            errors.insert(column.name.clone(), reason);
        }
    }

    errors
}

/// Build the insert payload for a pending row.
///
/// Auto-increment and defaulted columns are left out when empty so the
/// database fills them in. The default marker is always left out.
pub fn insertion_to_payload(insertion: &PendingInsertion, columns: &[TableColumn]) -> RowPayload {
    let mut payload = RowPayload::new();

    for (name, value) in &insertion.data {
        let Some(value) = value.as_value() else {
            continue;
        };
        let generated = columns
            .iter()
            .find(|c| &c.name == name)
            .is_some_and(|c| c.is_auto_increment || c.has_default());
        if generated && sqlbench_core::is_empty_value(value) {
            continue;
        }
        payload.insert(name.clone(), value.clone());
    }

    payload
}

/// Pending rows whose display index is in `indices`
pub fn filter_insertions_by_indices<'a, I>(
    insertions: I,
    indices: &BTreeSet<usize>,
) -> Vec<&'a PendingInsertion>
where
    I: IntoIterator<Item = &'a PendingInsertion>,
{
    insertions
        .into_iter()
        .filter(|i| indices.contains(&i.display_index))
        .collect()
}
