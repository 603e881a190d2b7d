//! Query execution and schema access

use sqlbench_core::{ForeignKey, IndexInfo, TableColumn, TableSchema, find_table};
use sqlbench_query::parameters::ParamValues;
use sqlbench_query::{
    clamp_page, extract_table_name, interpolate_query_params, is_select_query,
    missing_query_params, sanitize_statement, split_queries,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::SessionManager;
use crate::error::{SessionError, SessionResult};
use crate::query_builder::build_table_query;
use crate::tab::{Tab, TabKind, TabPatch};

impl SessionManager {
    /// Statements a tab would send, in order.
    ///
    /// Table tabs send their browse query. Other tabs send their query text
    /// with saved parameter values substituted, split into statements.
    pub fn tab_statements(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<Vec<String>> {
        let tab = self.tab(connection_id, tab_id)?;
        let driver = self.driver(connection_id)?;

        if tab.kind == TabKind::Table {
            return build_table_query(&tab, &driver)
                .map(|sql| vec![sql])
                .ok_or(SessionError::NoTableBound(tab_id));
        }

        let values: ParamValues = tab.query_params.clone().into_iter().collect();
        let missing = missing_query_params(&tab.query, &values);
        if !missing.is_empty() {
            tracing::debug!(?missing, "query has parameters without values");
        }

        let sql = interpolate_query_params(&tab.query, &values);
        Ok(split_queries(&sql)
            .iter()
            .map(|statement| sanitize_statement(statement))
            .filter(|statement| !statement.is_empty())
            .collect())
    }

    /// Execute a tab's statements one after another.
    ///
    /// The last statement's result, or the first error, is recorded on the
    /// tab together with the elapsed time. Execution stops at the first
    /// failing statement. A successful single-table read binds the tab to
    /// that table so its rows become editable.
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id, tab_id = %tab_id))]
    pub async fn run_tab_query(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<()> {
        let statements = self.tab_statements(connection_id, tab_id)?;
        let tab = self.tab(connection_id, tab_id)?;

        self.set_transient(
            connection_id,
            tab_id,
            TabPatch {
                is_loading: Some(true),
                error: Some(None),
                ..TabPatch::default()
            },
        )?;

        let page_size = self.settings.default_page_size;
        let start = Instant::now();
        let mut last_result = None;
        let mut failure = None;

        for statement in &statements {
            let paged = is_select_query(statement) && tab.limit_clause.is_none();
            let (limit, page) = if paged {
                (Some(page_size), Some(tab.page))
            } else {
                (None, None)
            };

            tracing::debug!(sql_preview = %statement.chars().take(50).collect::<String>(), "executing statement");
            match self
                .backend
                .execute_query(connection_id, statement, limit, page)
                .await
            {
                Ok(result) => last_result = Some(result),
                Err(e) => {
                    tracing::error!(error = %e, "statement failed");
                    failure = Some(e);
                    break;
                }
            }
        }

        let elapsed = start.elapsed();
        let mut patch = TabPatch {
            error: Some(failure.as_ref().map(|e| e.to_string())),
            execution_time: Some(Some(elapsed)),
            is_loading: Some(false),
            selected_rows: Some(BTreeSet::new()),
            ..TabPatch::default()
        };

        if failure.is_none() {
            self.bind_result_table(connection_id, &tab, statements.last(), &mut patch)
                .await;
            patch.result = Some(last_result);
        } else {
            patch.result = Some(None);
        }

        tracing::info!(
            statement_count = statements.len(),
            duration_ms = elapsed.as_millis() as u64,
            failed = failure.is_some(),
            "tab query finished"
        );

        // The tab may have been closed while the query ran
        if !self.update_tab(connection_id, tab_id, patch)? {
            tracing::debug!("tab closed before its query finished");
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Work out which table (and primary key) a finished query maps onto
    async fn bind_result_table(
        &self,
        connection_id: &str,
        tab: &Tab,
        last_statement: Option<&String>,
        patch: &mut TabPatch,
    ) {
        let table = match tab.kind {
            TabKind::Table => tab.active_table.clone(),
            _ => last_statement.and_then(|sql| extract_table_name(sql)),
        };

        if tab.kind != TabKind::Table && table != tab.active_table {
            patch.active_table = Some(table.clone());
            patch.pk_column = Some(None);
        } else if tab.pk_column.is_some() {
            return;
        }

        let Some(table) = table else {
            return;
        };
        match self.primary_key_for(connection_id, &table, tab.schema.as_deref()).await {
            Ok(pk) => patch.pk_column = Some(pk),
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "could not resolve primary key");
            }
        }
    }

    async fn primary_key_for(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> SessionResult<Option<String>> {
        let columns = self.table_columns(connection_id, table, schema).await?;
        Ok(columns.into_iter().find(|c| c.is_pk).map(|c| c.name))
    }

    /// Move a tab to another page of its result.
    ///
    /// When the last result reported pagination the page is clamped to the
    /// pages that exist. Returns the page the tab ended up on; the caller
    /// reruns the query to fetch it.
    pub fn go_to_page(&self, connection_id: &str, tab_id: Uuid, page: u32) -> SessionResult<u32> {
        let tab = self.tab(connection_id, tab_id)?;
        let page = match tab.result.as_ref().and_then(|r| r.pagination) {
            Some(pagination) => clamp_page(page, pagination.page_count()),
            None => page.max(1),
        };

        self.update_tab(
            connection_id,
            tab_id,
            TabPatch {
                page: Some(page),
                ..TabPatch::default()
            },
        )?;
        Ok(page)
    }

    /// Patch a tab without scheduling a write
    fn set_transient(&self, connection_id: &str, tab_id: Uuid, patch: TabPatch) -> SessionResult<()> {
        self.mutate_tabs(connection_id, |tabs| (tabs.update(tab_id, patch), false))?
            .then_some(())
            .ok_or(SessionError::TabNotFound(tab_id))
    }

    /// Ask the backend to abort whatever is running on the connection
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id))]
    pub async fn cancel_query(&self, connection_id: &str) -> SessionResult<()> {
        self.backend.cancel_query(connection_id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to cancel query");
            e
        })?;
        tracing::info!("query cancelled");
        Ok(())
    }

    // ============ Schema ============

    pub fn schema_version(&self, connection_id: &str) -> SessionResult<u64> {
        self.with_connection(connection_id, |state| state.schema_version)
    }

    /// Cached schema snapshot for the connection's current schema version
    pub async fn schema(&self, connection_id: &str) -> SessionResult<Arc<Vec<TableSchema>>> {
        let version = self.schema_version(connection_id)?;
        Ok(self
            .schema_cache
            .get(self.backend.as_ref(), connection_id, Some(version))
            .await?)
    }

    /// Bump the schema version and fetch a fresh snapshot
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id))]
    pub async fn refresh_schema(&self, connection_id: &str) -> SessionResult<Arc<Vec<TableSchema>>> {
        let version = self.with_connection_mut(connection_id, |state| {
            state.schema_version += 1;
            state.schema_version
        })?;
        tracing::info!(version, "refreshing schema");
        self.schema(connection_id).await
    }

    /// Columns of a table, from the snapshot when it identifies the table.
    ///
    /// A table missing from the snapshot, or a bare name shared by several
    /// schemas, is looked up through the backend.
    pub async fn table_columns(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> SessionResult<Vec<TableColumn>> {
        let tables = self.schema(connection_id).await?;
        if let Some(found) = find_table(&tables, table, schema) {
            return Ok(found.columns.clone());
        }

        tracing::debug!(table = %table, ?schema, "table not resolved from schema snapshot, asking backend");
        Ok(self.backend.get_columns(connection_id, table, schema).await?)
    }

    pub async fn foreign_keys(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> SessionResult<Vec<ForeignKey>> {
        let tables = self.schema(connection_id).await?;
        if let Some(found) = find_table(&tables, table, schema) {
            return Ok(found.foreign_keys.clone());
        }
        Ok(self
            .backend
            .get_foreign_keys(connection_id, table, schema)
            .await?)
    }

    pub async fn indexes(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> SessionResult<Vec<IndexInfo>> {
        Ok(self.backend.get_indexes(connection_id, table, schema).await?)
    }
}
