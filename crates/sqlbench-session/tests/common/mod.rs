//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlbench_core::{
    BenchError, DatabaseBackend, ForeignKey, IndexInfo, QueryResult, Result, RowPayload,
    TableColumn, TableSchema,
};
use sqlbench_session::{MemoryTabStorage, SessionManager};
use sqlbench_settings::SessionSettings;
use std::sync::Arc;
use tokio::sync::Notify;

/// Mock backend for testing session logic without a real database.
///
/// Answers statements by SQL pattern, serves a fixed schema snapshot and
/// records every boundary call for assertions.
pub struct MockBackend {
    pub tables: Vec<TableSchema>,
    /// If a statement contains the pattern, the result is returned
    pub query_responses: Vec<(String, QueryResult)>,
    /// Statements containing any of these patterns fail
    pub failing_statements: Vec<String>,
    /// Row writes touching any of these values fail
    pub failing_values: Vec<JsonValue>,
    /// `(sql, limit, page)` of every executed statement
    pub executions: parking_lot::Mutex<Vec<(String, Option<u32>, Option<u32>)>>,
    /// Readable log of every row write
    pub write_log: parking_lot::Mutex<Vec<String>>,
    pub snapshot_count: parking_lot::Mutex<usize>,
    pub cancel_count: parking_lot::Mutex<usize>,
    /// `get_columns` calls as `(table, schema)`
    pub column_lookups: parking_lot::Mutex<Vec<(String, Option<String>)>>,
    /// When set, row writes park until the gate is opened
    pub write_gate: Option<WriteGate>,
}

/// Holds row writes until the test releases them
#[derive(Clone, Default)]
pub struct WriteGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl WriteGate {
    /// Wait until a write is parked at the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            tables: vec![],
            query_responses: vec![],
            failing_statements: vec![],
            failing_values: vec![],
            executions: parking_lot::Mutex::new(Vec::new()),
            write_log: parking_lot::Mutex::new(Vec::new()),
            snapshot_count: parking_lot::Mutex::new(0),
            cancel_count: parking_lot::Mutex::new(0),
            column_lookups: parking_lot::Mutex::new(Vec::new()),
            write_gate: None,
        }
    }

    pub fn with_write_gate(mut self, gate: WriteGate) -> Self {
        self.write_gate = Some(gate);
        self
    }

    pub fn column_lookups(&self) -> Vec<(String, Option<String>)> {
        self.column_lookups.lock().clone()
    }

    async fn gate(&self) {
        if let Some(gate) = &self.write_gate {
            gate.pass().await;
        }
    }

    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_query_response(mut self, sql_contains: impl Into<String>, result: QueryResult) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn with_failing_statement(mut self, sql_contains: impl Into<String>) -> Self {
        self.failing_statements.push(sql_contains.into());
        self
    }

    pub fn with_failing_value(mut self, value: JsonValue) -> Self {
        self.failing_values.push(value);
        self
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executions.lock().iter().map(|(sql, _, _)| sql.clone()).collect()
    }

    pub fn executions(&self) -> Vec<(String, Option<u32>, Option<u32>)> {
        self.executions.lock().clone()
    }

    pub fn write_log(&self) -> Vec<String> {
        self.write_log.lock().clone()
    }

    pub fn snapshot_count(&self) -> usize {
        *self.snapshot_count.lock()
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancel_count.lock()
    }

    fn check_values<'a>(&self, values: impl IntoIterator<Item = &'a JsonValue>) -> Result<()> {
        for value in values {
            if self.failing_values.contains(value) {
                return Err(BenchError::Backend(format!("constraint violation on {}", value)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseBackend for MockBackend {
    async fn execute_query(
        &self,
        _connection_id: &str,
        sql: &str,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<QueryResult> {
        self.executions.lock().push((sql.to_string(), limit, page));

        if self.failing_statements.iter().any(|p| sql.contains(p.as_str())) {
            return Err(BenchError::Backend(format!("syntax error near '{}'", sql)));
        }

        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }

        Ok(QueryResult {
            affected_rows: 1,
            ..QueryResult::empty()
        })
    }

    async fn cancel_query(&self, _connection_id: &str) -> Result<()> {
        *self.cancel_count.lock() += 1;
        Ok(())
    }

    async fn get_columns(
        &self,
        _connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<TableColumn>> {
        self.column_lookups
            .lock()
            .push((table.to_string(), schema.map(String::from)));
        self.tables
            .iter()
            .find(|t| t.name == table && (schema.is_none() || t.schema.as_deref() == schema))
            .map(|t| t.columns.clone())
            .ok_or_else(|| BenchError::NotFound(format!("table {}", table)))
    }

    async fn get_foreign_keys(
        &self,
        _connection_id: &str,
        _table: &str,
        _schema: Option<&str>,
    ) -> Result<Vec<ForeignKey>> {
        Ok(vec![])
    }

    async fn get_indexes(
        &self,
        _connection_id: &str,
        _table: &str,
        _schema: Option<&str>,
    ) -> Result<Vec<IndexInfo>> {
        Ok(vec![])
    }

    async fn get_schema_snapshot(&self, _connection_id: &str) -> Result<Vec<TableSchema>> {
        *self.snapshot_count.lock() += 1;
        Ok(self.tables.clone())
    }

    async fn insert_record(&self, _connection_id: &str, table: &str, data: RowPayload) -> Result<u64> {
        self.gate().await;
        self.check_values(data.values())?;
        let payload = serde_json::to_string(&data)?;
        self.write_log.lock().push(format!("INSERT {} {}", table, payload));
        Ok(1)
    }

    async fn update_record(
        &self,
        _connection_id: &str,
        table: &str,
        pk_col: &str,
        pk_val: JsonValue,
        col_name: &str,
        new_val: JsonValue,
    ) -> Result<u64> {
        self.gate().await;
        self.check_values([&pk_val, &new_val])?;
        self.write_log.lock().push(format!(
            "UPDATE {} {}={} WHERE {}={}",
            table, col_name, new_val, pk_col, pk_val
        ));
        Ok(1)
    }

    async fn delete_record(
        &self,
        _connection_id: &str,
        table: &str,
        pk_col: &str,
        pk_val: JsonValue,
    ) -> Result<u64> {
        self.check_values([&pk_val])?;
        self.write_log
            .lock()
            .push(format!("DELETE {} {}={}", table, pk_col, pk_val));
        Ok(1)
    }
}

/// `users(id PK auto, email NOT NULL, status NOT NULL DEFAULT, nickname)`
pub fn users_table() -> TableSchema {
    TableSchema::new(
        "users",
        vec![
            TableColumn::new("id", "integer").primary_key().auto_increment(),
            TableColumn::new("email", "text").not_null(),
            TableColumn::new("status", "text")
                .not_null()
                .with_default("'active'"),
            TableColumn::new("nickname", "text"),
        ],
    )
}

pub fn orders_table() -> TableSchema {
    TableSchema::new(
        "orders",
        vec![
            TableColumn::new("order_id", "integer").primary_key(),
            TableColumn::new("total", "numeric"),
        ],
    )
}

pub fn mock_query_result(columns: Vec<&str>, rows: Vec<Vec<JsonValue>>) -> QueryResult {
    QueryResult {
        columns: columns.into_iter().map(String::from).collect(),
        rows,
        ..QueryResult::empty()
    }
}

/// Manager over a mock backend and in-memory storage
pub fn manager_with(
    backend: MockBackend,
) -> (SessionManager, Arc<MockBackend>, Arc<MemoryTabStorage>) {
    manager_with_storage(backend, MemoryTabStorage::new())
}

pub fn manager_with_storage(
    backend: MockBackend,
    storage: MemoryTabStorage,
) -> (SessionManager, Arc<MockBackend>, Arc<MemoryTabStorage>) {
    let backend = Arc::new(backend);
    let storage = Arc::new(storage);
    let manager = SessionManager::new(backend.clone(), storage.clone(), SessionSettings::default());
    (manager, backend, storage)
}
