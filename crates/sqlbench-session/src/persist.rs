//! Tab session persistence
//!
//! Only durable tab fields are written. Results, errors, timings, pending
//! edits and the row selection never leave memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlbench_core::Result;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::tab::{FlowState, Tab, TabKind};

mod file;
mod memory;
mod queue;

pub use file::FileTabStorage;
pub use memory::MemoryTabStorage;
pub use queue::PersistQueue;

/// Current session format version - increment when the layout changes
pub const SESSION_VERSION: usize = 1;

/// Durable fields of one tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTab {
    pub id: Uuid,
    pub title: String,
    pub kind: TabKind,
    pub connection_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub active_table: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub pk_column: Option<String>,
    #[serde(default)]
    pub filter_clause: Option<String>,
    #[serde(default)]
    pub sort_clause: Option<String>,
    #[serde(default)]
    pub limit_clause: Option<u32>,
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,
    #[serde(default)]
    pub is_editor_open: bool,
    #[serde(default)]
    pub flow_state: Option<FlowState>,
}

fn first_page() -> u32 {
    1
}

impl From<&Tab> for PersistedTab {
    fn from(tab: &Tab) -> Self {
        Self {
            id: tab.id,
            title: tab.title.clone(),
            kind: tab.kind,
            connection_id: tab.connection_id.clone(),
            query: tab.query.clone(),
            page: tab.page,
            active_table: tab.active_table.clone(),
            schema: tab.schema.clone(),
            pk_column: tab.pk_column.clone(),
            filter_clause: tab.filter_clause.clone(),
            sort_clause: tab.sort_clause.clone(),
            limit_clause: tab.limit_clause,
            query_params: tab.query_params.clone(),
            is_editor_open: tab.is_editor_open,
            flow_state: tab.flow_state.clone(),
        }
    }
}

impl From<PersistedTab> for Tab {
    fn from(persisted: PersistedTab) -> Self {
        let mut tab = Tab::new(persisted.connection_id, persisted.kind, persisted.title);
        tab.id = persisted.id;
        tab.query = persisted.query;
        tab.page = persisted.page.max(1);
        tab.active_table = persisted.active_table;
        tab.schema = persisted.schema;
        tab.pk_column = persisted.pk_column;
        tab.filter_clause = persisted.filter_clause;
        tab.sort_clause = persisted.sort_clause;
        tab.limit_clause = persisted.limit_clause;
        tab.query_params = persisted.query_params;
        tab.is_editor_open = persisted.is_editor_open;
        tab.flow_state = persisted.flow_state;
        tab
    }
}

/// Everything stored for one connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Version for migration purposes
    pub version: usize,
    pub tabs: Vec<PersistedTab>,
    pub active_tab_id: Option<Uuid>,
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(tabs: Vec<PersistedTab>, active_tab_id: Option<Uuid>) -> Self {
        Self {
            version: SESSION_VERSION,
            tabs,
            active_tab_id,
            saved_at: Utc::now(),
        }
    }
}

/// Durable storage for tab sessions, keyed by connection id
#[async_trait]
pub trait TabStorage: Send + Sync {
    /// `Ok(None)` when nothing was saved for the connection yet
    async fn load(&self, connection_id: &str) -> Result<Option<PersistedSession>>;

    async fn save(&self, connection_id: &str, session: &PersistedSession) -> Result<()>;
}
