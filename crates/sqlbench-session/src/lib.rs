//! sqlbench Session Layer
//!
//! This crate owns the working state of a SQL workbench session: the tabs
//! open against each connection, their persistence, and the row edits made
//! in a result grid before they are committed.
//!
//! # Architecture
//!
//! ```text
//! Embedding application (UI, CLI)
//!     ↓
//! Session Layer (sqlbench-session) ← This crate
//!     ↓
//! Domain Layer (sqlbench-query, sqlbench-schema)
//!     ↓
//! Infrastructure Layer (sqlbench-core, backend implementation)
//! ```
//!
//! # Pieces
//!
//! - [`SessionManager`] - per-connection tab sets, query execution, schema access, commits
//! - [`ConnectionTabs`] - the tab state machine for one connection
//! - [`PendingEdits`] - speculative insertions, cell changes and deletions
//! - [`TabStorage`] - where durable tab fields are saved, with [`PersistQueue`] debouncing writes

mod error;
mod manager;
pub mod pending;
mod persist;
mod query_builder;
mod store;
mod tab;

pub use error::{SessionError, SessionResult};
pub use manager::{CommitItem, CommitOutcome, CommitReport, CommitStatus, SessionManager};
pub use pending::{
    CellDisplay, CellValue, ColumnTraits, PendingChange, PendingDeletion, PendingEdits,
    PendingInsertion, ResolvedCell, RowKey, TempRowId,
};
pub use persist::{
    FileTabStorage, MemoryTabStorage, PersistQueue, PersistedSession, PersistedTab,
    SESSION_VERSION, TabStorage,
};
pub use query_builder::{build_reset_to_default, build_table_query, sql_literal};
pub use store::ConnectionTabs;
pub use tab::{FlowState, NewTab, Tab, TabKind, TabPatch};
