//! Tab model
//!
//! A [`Tab`] carries durable fields, which survive a restart, and transient
//! fields (last result, error, timing, pending edits, selection) that are
//! reset whenever a tab is restored from storage.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlbench_core::QueryResult;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use uuid::Uuid;

use crate::pending::PendingEdits;

/// What a tab is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    /// Free-form SQL editor
    Console,
    /// Browsing one table
    Table,
    /// Visual query builder
    QueryBuilder,
}

impl TabKind {
    /// Base title for untitled tabs of this kind
    pub fn base_title(&self) -> &'static str {
        match self {
            TabKind::Console => "Console",
            TabKind::Table => "Table",
            TabKind::QueryBuilder => "Visual Query",
        }
    }
}

/// Serialized visual query graph (nodes and edges).
///
/// Stored and passed through untouched; only the layout component reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowState(pub JsonValue);

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: Uuid,
    pub title: String,
    pub kind: TabKind,
    pub connection_id: String,
    pub query: String,
    /// 1-based page of the current result
    pub page: u32,
    pub active_table: Option<String>,
    pub schema: Option<String>,
    pub pk_column: Option<String>,
    /// WHERE fragment without the keyword
    pub filter_clause: Option<String>,
    /// ORDER BY fragment without the keyword
    pub sort_clause: Option<String>,
    pub limit_clause: Option<u32>,
    pub query_params: BTreeMap<String, String>,
    pub is_editor_open: bool,
    pub flow_state: Option<FlowState>,

    pub result: Option<QueryResult>,
    pub error: Option<String>,
    pub execution_time: Option<Duration>,
    pub is_loading: bool,
    pub pending: PendingEdits,
    pub selected_rows: BTreeSet<usize>,
}

impl Tab {
    pub fn new(connection_id: impl Into<String>, kind: TabKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            connection_id: connection_id.into(),
            query: String::new(),
            page: 1,
            active_table: None,
            schema: None,
            pk_column: None,
            filter_clause: None,
            sort_clause: None,
            limit_clause: None,
            query_params: BTreeMap::new(),
            is_editor_open: true,
            flow_state: None,
            result: None,
            error: None,
            execution_time: None,
            is_loading: false,
            pending: PendingEdits::default(),
            selected_rows: BTreeSet::new(),
        }
    }

    /// Default console tab for a connection
    pub fn console(connection_id: impl Into<String>) -> Self {
        Self::new(connection_id, TabKind::Console, TabKind::Console.base_title())
    }

    /// Drop everything that is not persisted
    pub fn reset_transient(&mut self) {
        self.result = None;
        self.error = None;
        self.execution_time = None;
        self.is_loading = false;
        self.pending.clear();
        self.selected_rows.clear();
    }

    /// Whether this tab browses `table` (and `schema`, when one is given)
    pub fn is_bound_to(&self, table: &str, schema: Option<&str>) -> bool {
        self.kind == TabKind::Table
            && self.active_table.as_deref() == Some(table)
            && schema.is_none_or(|s| self.schema.as_deref() == Some(s))
    }
}

/// Request to open a tab
#[derive(Debug, Clone, PartialEq)]
pub struct NewTab {
    pub kind: TabKind,
    pub title: Option<String>,
    pub query: Option<String>,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub pk_column: Option<String>,
    pub flow_state: Option<FlowState>,
}

impl NewTab {
    fn of_kind(kind: TabKind) -> Self {
        Self {
            kind,
            title: None,
            query: None,
            table: None,
            schema: None,
            pk_column: None,
            flow_state: None,
        }
    }

    pub fn console() -> Self {
        Self::of_kind(TabKind::Console)
    }

    pub fn query_builder() -> Self {
        Self::of_kind(TabKind::QueryBuilder)
    }

    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::of_kind(TabKind::Table)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_pk_column(mut self, pk_column: impl Into<String>) -> Self {
        self.pk_column = Some(pk_column.into());
        self
    }

    pub fn with_flow_state(mut self, flow_state: FlowState) -> Self {
        self.flow_state = Some(flow_state);
        self
    }
}

/// Partial update merged into a tab.
///
/// `None` leaves a field alone. Optional tab fields take `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabPatch {
    pub title: Option<String>,
    pub query: Option<String>,
    pub page: Option<u32>,
    pub active_table: Option<Option<String>>,
    pub schema: Option<Option<String>>,
    pub pk_column: Option<Option<String>>,
    pub filter_clause: Option<Option<String>>,
    pub sort_clause: Option<Option<String>>,
    pub limit_clause: Option<Option<u32>>,
    pub query_params: Option<BTreeMap<String, String>>,
    pub is_editor_open: Option<bool>,
    pub flow_state: Option<Option<FlowState>>,

    pub result: Option<Option<QueryResult>>,
    pub error: Option<Option<String>>,
    pub execution_time: Option<Option<Duration>>,
    pub is_loading: Option<bool>,
    pub selected_rows: Option<BTreeSet<usize>>,
}

impl TabPatch {
    /// Whether applying this patch changes anything that gets persisted
    pub fn touches_durable(&self) -> bool {
        self.title.is_some()
            || self.query.is_some()
            || self.page.is_some()
            || self.active_table.is_some()
            || self.schema.is_some()
            || self.pk_column.is_some()
            || self.filter_clause.is_some()
            || self.sort_clause.is_some()
            || self.limit_clause.is_some()
            || self.query_params.is_some()
            || self.is_editor_open.is_some()
            || self.flow_state.is_some()
    }

    pub fn apply(self, tab: &mut Tab) {
        if let Some(title) = self.title {
            tab.title = title;
        }
        if let Some(query) = self.query {
            tab.query = query;
        }
        if let Some(page) = self.page {
            tab.page = page.max(1);
        }
        if let Some(active_table) = self.active_table {
            tab.active_table = active_table;
        }
        if let Some(schema) = self.schema {
            tab.schema = schema;
        }
        if let Some(pk_column) = self.pk_column {
            tab.pk_column = pk_column;
        }
        if let Some(filter) = self.filter_clause {
            tab.filter_clause = filter;
        }
        if let Some(sort) = self.sort_clause {
            tab.sort_clause = sort;
        }
        if let Some(limit) = self.limit_clause {
            tab.limit_clause = limit;
        }
        if let Some(params) = self.query_params {
            tab.query_params = params;
        }
        if let Some(open) = self.is_editor_open {
            tab.is_editor_open = open;
        }
        if let Some(flow_state) = self.flow_state {
            tab.flow_state = flow_state;
        }
        if let Some(result) = self.result {
            tab.result = result;
        }
        if let Some(error) = self.error {
            tab.error = error;
        }
        if let Some(execution_time) = self.execution_time {
            tab.execution_time = execution_time;
        }
        if let Some(loading) = self.is_loading {
            tab.is_loading = loading;
        }
        if let Some(rows) = self.selected_rows {
            tab.selected_rows = rows;
        }
    }
}
