//! Committing pending row edits through the backend

use serde_json::Value as JsonValue;
use sqlbench_core::{BenchError, Driver, TableColumn};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::SessionManager;
use crate::error::{SessionError, SessionResult};
use crate::pending::{
    CellValue, PendingChange, PendingDeletion, PendingInsertion, RowKey, TempRowId,
    filter_insertions_by_indices, insertion_to_payload, validate_insertion,
};
use crate::query_builder::build_reset_to_default;

/// One unit of work sent to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitItem {
    Insertion(TempRowId),
    Change { row: RowKey, column: String },
    Deletion(RowKey),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitStatus {
    Applied { affected_rows: u64 },
    /// Column name to reason; nothing was sent
    Invalid(BTreeMap<String, String>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    pub item: CommitItem,
    pub status: CommitStatus,
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, CommitStatus::Applied { .. })
    }
}

/// Per-item results of a commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    pub outcomes: Vec<CommitOutcome>,
}

impl CommitReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.applied_count()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(CommitOutcome::is_applied)
    }

    fn push(&mut self, item: CommitItem, result: Result<u64, BenchError>) {
        let status = match result {
            Ok(affected_rows) => CommitStatus::Applied { affected_rows },
            Err(e) => CommitStatus::Failed(e.to_string()),
        };
        self.outcomes.push(CommitOutcome { item, status });
    }
}

/// Table a commit writes to
struct CommitTarget<'a> {
    connection_id: &'a str,
    table: &'a str,
    schema: Option<&'a str>,
    driver: Driver,
}

impl SessionManager {
    /// Send a tab's pending edits to the database.
    ///
    /// With a selection only the pending rows at those display indices are
    /// inserted; without one every insertion, cell change and deletion is
    /// sent. Rows failing validation are not sent. Applied items leave the
    /// pending state, everything else stays pending for another attempt.
    #[tracing::instrument(skip(self, selection), fields(connection_id = %connection_id, tab_id = %tab_id))]
    pub async fn commit_pending(
        &self,
        connection_id: &str,
        tab_id: Uuid,
        selection: Option<&BTreeSet<usize>>,
    ) -> SessionResult<CommitReport> {
        let tab = self.tab(connection_id, tab_id)?;
        let table = tab
            .active_table
            .clone()
            .ok_or(SessionError::NoTableBound(tab_id))?;
        let target = CommitTarget {
            connection_id,
            table: &table,
            schema: tab.schema.as_deref(),
            driver: self.driver(connection_id)?,
        };
        let columns = self
            .table_columns(connection_id, &table, target.schema)
            .await?;

        let insertions: Vec<PendingInsertion> = match selection {
            Some(indices) => filter_insertions_by_indices(tab.pending.insertions(), indices)
                .into_iter()
                .cloned()
                .collect(),
            None => tab.pending.insertions().into_iter().cloned().collect(),
        };

        let (mut changes, mut deletions): (Vec<_>, Vec<_>) = match selection {
            Some(_) => (vec![], vec![]),
            None => (
                tab.pending
                    .changes()
                    .map(|(k, c)| (k.clone(), c.clone()))
                    .collect(),
                tab.pending
                    .deletions()
                    .map(|(k, d)| (k.clone(), d.clone()))
                    .collect(),
            ),
        };
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        deletions.sort_by(|a, b| a.0.cmp(&b.0));

        let pk_column = if changes.is_empty() && deletions.is_empty() {
            None
        } else {
            let pk = tab
                .pk_column
                .clone()
                .or_else(|| columns.iter().find(|c| c.is_pk).map(|c| c.name.clone()))
                .ok_or_else(|| SessionError::NoPrimaryKey(table.clone()))?;
            Some(pk)
        };

        let mut report = CommitReport::default();
        self.commit_insertions(&target, &columns, &insertions, &mut report)
            .await;
        if let Some(pk_column) = pk_column.as_deref() {
            self.commit_changes(&target, pk_column, &changes, &mut report)
                .await;
            self.commit_deletions(&target, pk_column, &deletions, &mut report)
                .await;
        }

        self.settle_applied(connection_id, tab_id, &report, &insertions, &changes);

        tracing::info!(
            table = %table,
            applied = report.applied_count(),
            failed = report.failed_count(),
            "committed pending edits"
        );
        Ok(report)
    }

    async fn commit_insertions(
        &self,
        target: &CommitTarget<'_>,
        columns: &[TableColumn],
        insertions: &[PendingInsertion],
        report: &mut CommitReport,
    ) {
        for insertion in insertions {
            let item = CommitItem::Insertion(insertion.temp_id);
            let errors = validate_insertion(insertion, columns);
            if !errors.is_empty() {
                tracing::debug!(row = %insertion.temp_id, ?errors, "pending row failed validation");
                report.outcomes.push(CommitOutcome {
                    item,
                    status: CommitStatus::Invalid(errors),
                });
                continue;
            }

            let payload = insertion_to_payload(insertion, columns);
            let result = self
                .backend
                .insert_record(target.connection_id, target.table, payload)
                .await;
            if let Err(e) = &result {
                tracing::error!(row = %insertion.temp_id, error = %e, "insert failed");
            }
            report.push(item, result);
        }
    }

    async fn commit_changes(
        &self,
        target: &CommitTarget<'_>,
        pk_column: &str,
        changes: &[(RowKey, PendingChange)],
        report: &mut CommitReport,
    ) {
        for (row, change) in changes {
            for (column, value) in &change.changes {
                let result = match value {
                    CellValue::Default => {
                        self.reset_to_default(target, pk_column, &change.pk_original, column)
                            .await
                    }
                    CellValue::Value(value) => {
                        self.backend
                            .update_record(
                                target.connection_id,
                                target.table,
                                pk_column,
                                change.pk_original.clone(),
                                column,
                                value.clone(),
                            )
                            .await
                    }
                };
                if let Err(e) = &result {
                    tracing::error!(row = %row, column = %column, error = %e, "update failed");
                }
                report.push(
                    CommitItem::Change {
                        row: row.clone(),
                        column: column.clone(),
                    },
                    result,
                );
            }
        }
    }

    async fn reset_to_default(
        &self,
        target: &CommitTarget<'_>,
        pk_column: &str,
        pk_value: &JsonValue,
        column: &str,
    ) -> Result<u64, BenchError> {
        let sql = build_reset_to_default(
            &target.driver,
            target.table,
            target.schema,
            column,
            pk_column,
            pk_value,
        );
        self.backend
            .execute_query(target.connection_id, &sql, None, None)
            .await
            .map(|result| result.affected_rows)
    }

    async fn commit_deletions(
        &self,
        target: &CommitTarget<'_>,
        pk_column: &str,
        deletions: &[(RowKey, PendingDeletion)],
        report: &mut CommitReport,
    ) {
        for (row, deletion) in deletions {
            let result = self
                .backend
                .delete_record(
                    target.connection_id,
                    target.table,
                    pk_column,
                    deletion.pk_original.clone(),
                )
                .await;
            if let Err(e) = &result {
                tracing::error!(row = %row, error = %e, "delete failed");
            }
            report.push(CommitItem::Deletion(row.clone()), result);
        }
    }

    /// Drop applied items from the tab's pending state.
    ///
    /// Edits made while the commit was in flight win: an item is only dropped
    /// when its pending value is still the one that was sent.
    fn settle_applied(
        &self,
        connection_id: &str,
        tab_id: Uuid,
        report: &CommitReport,
        insertions: &[PendingInsertion],
        changes: &[(RowKey, PendingChange)],
    ) {
        let settled = self.edit_pending(connection_id, tab_id, |pending| {
            for outcome in report.outcomes.iter().filter(|o| o.is_applied()) {
                match &outcome.item {
                    CommitItem::Insertion(temp_id) => {
                        let sent = insertions.iter().find(|i| i.temp_id == *temp_id);
                        let unchanged = pending
                            .insertion(*temp_id)
                            .zip(sent)
                            .is_some_and(|(current, sent)| current.data == sent.data);
                        if unchanged {
                            pending.discard_insertion(*temp_id);
                        } else {
                            tracing::debug!(row = %temp_id, "pending row edited during commit, keeping it");
                        }
                    }
                    CommitItem::Change { row, column } => {
                        let sent = changes
                            .iter()
                            .find(|(key, _)| key == row)
                            .and_then(|(_, change)| change.changes.get(column));
                        if sent.is_some() && pending.pending_value(row, column) == sent {
                            pending.revert_cell(row, column);
                        } else {
                            tracing::debug!(row = %row, column = %column, "cell edited during commit, keeping it");
                        }
                    }
                    CommitItem::Deletion(row) => {
                        pending.unmark_deleted(row);
                    }
                }
            }
        });
        if let Err(e) = settled {
            tracing::debug!(error = %e, "tab gone before commit settled");
        }
    }
}
