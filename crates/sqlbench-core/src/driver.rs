//! The external command boundary
//!
//! Everything that touches a live database goes through [`DatabaseBackend`].
//! Implementations own connection handling, drivers and retries; the session
//! engine only issues calls keyed by connection id and quoted names.

use crate::{ForeignKey, IndexInfo, QueryResult, Result, TableColumn, TableSchema};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Column name to value payload for row inserts
pub type RowPayload = BTreeMap<String, JsonValue>;

/// Database backend interface
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Execute one statement. `limit` and `page` request a paged read (page is 1-based).
    async fn execute_query(
        &self,
        connection_id: &str,
        sql: &str,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<QueryResult>;

    /// Ask the backend to abort the statement currently running on a connection
    async fn cancel_query(&self, connection_id: &str) -> Result<()>;

    /// Get columns for a table
    async fn get_columns(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<TableColumn>>;

    /// Get foreign keys for a table
    async fn get_foreign_keys(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<ForeignKey>>;

    /// Get indexes for a table
    async fn get_indexes(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<IndexInfo>>;

    /// Fetch every table with its columns and foreign keys
    async fn get_schema_snapshot(&self, connection_id: &str) -> Result<Vec<TableSchema>>;

    /// Insert a single row, returning the affected row count
    async fn insert_record(
        &self,
        connection_id: &str,
        table: &str,
        data: RowPayload,
    ) -> Result<u64>;

    /// Update one cell of the row identified by `pk_col = pk_val`
    async fn update_record(
        &self,
        connection_id: &str,
        table: &str,
        pk_col: &str,
        pk_val: JsonValue,
        col_name: &str,
        new_val: JsonValue,
    ) -> Result<u64>;

    /// Delete the row identified by `pk_col = pk_val`
    async fn delete_record(
        &self,
        connection_id: &str,
        table: &str,
        pk_col: &str,
        pk_val: JsonValue,
    ) -> Result<u64>;
}
