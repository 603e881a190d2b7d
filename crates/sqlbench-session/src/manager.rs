//! Session manager owning every connection's tabs
//!
//! The manager is the single owner of the per-connection tab sets, the
//! schema versions and the persistence queue. In-memory mutations happen
//! synchronously under short locks; boundary calls (backend, storage) are
//! awaited with no lock held.

use parking_lot::{Mutex, RwLock};
use sqlbench_core::{DatabaseBackend, Driver};
use sqlbench_schema::SchemaCache;
use sqlbench_settings::SessionSettings;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};
use crate::pending::PendingEdits;
use crate::persist::{PersistQueue, PersistedSession, TabStorage};
use crate::store::ConnectionTabs;
use crate::tab::{NewTab, Tab, TabPatch};

mod commit;
mod query;

pub use commit::{CommitItem, CommitOutcome, CommitReport, CommitStatus};

struct ConnectionState {
    tabs: ConnectionTabs,
    driver: Driver,
    /// Bumped on explicit schema refresh
    schema_version: u64,
}

pub struct SessionManager {
    backend: Arc<dyn DatabaseBackend>,
    storage: Arc<dyn TabStorage>,
    schema_cache: Arc<SchemaCache>,
    settings: SessionSettings,
    connections: RwLock<HashMap<String, ConnectionState>>,
    current: RwLock<Option<String>>,
    persist_queue: Mutex<PersistQueue>,
}

impl SessionManager {
    pub fn new(
        backend: Arc<dyn DatabaseBackend>,
        storage: Arc<dyn TabStorage>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            backend,
            storage,
            schema_cache: Arc::new(SchemaCache::default()),
            persist_queue: Mutex::new(PersistQueue::new(settings.persist_debounce())),
            settings,
            connections: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
        }
    }

    /// Share a schema cache with other managers in the process
    pub fn with_schema_cache(mut self, schema_cache: Arc<SchemaCache>) -> Self {
        self.schema_cache = schema_cache;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn schema_cache(&self) -> &Arc<SchemaCache> {
        &self.schema_cache
    }

    // ============ Connection lifecycle ============

    /// Load a connection's saved tabs, or start it with one console.
    ///
    /// A failed load is logged and treated like an empty session. Opening an
    /// already open connection does nothing.
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id))]
    pub async fn open_connection(&self, connection_id: &str, driver: Driver) {
        if self.is_open(connection_id) {
            tracing::debug!("connection already open");
            return;
        }

        let tabs = match self.storage.load(connection_id).await {
            Ok(Some(session)) => {
                tracing::info!(tab_count = session.tabs.len(), "restored tab session");
                ConnectionTabs::restore(connection_id, session)
            }
            Ok(None) => {
                tracing::debug!("no saved tab session");
                ConnectionTabs::new(connection_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tab session, starting fresh");
                ConnectionTabs::new(connection_id)
            }
        };

        self.connections
            .write()
            .entry(connection_id.to_string())
            .or_insert(ConnectionState {
                tabs,
                driver,
                schema_version: 0,
            });
    }

    /// Make `connection_id` the current connection.
    ///
    /// Pending writes for every connection are flushed first.
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id))]
    pub async fn switch_connection(&self, connection_id: &str, driver: Driver) {
        self.flush_all_persistence().await;
        self.open_connection(connection_id, driver).await;
        *self.current.write() = Some(connection_id.to_string());
        tracing::info!("switched connection");
    }

    /// Write any pending session for the connection and forget its tabs
    #[tracing::instrument(skip(self), fields(connection_id = %connection_id))]
    pub async fn close_connection(&self, connection_id: &str) {
        let pending = self.persist_queue.lock().take(connection_id);
        if let Some(session) = pending {
            self.write_sessions(vec![(connection_id.to_string(), session)])
                .await;
        }

        self.connections.write().remove(connection_id);
        let mut current = self.current.write();
        if current.as_deref() == Some(connection_id) {
            *current = None;
        }
    }

    pub fn current_connection(&self) -> Option<String> {
        self.current.read().clone()
    }

    pub fn is_open(&self, connection_id: &str) -> bool {
        self.connections.read().contains_key(connection_id)
    }

    pub fn driver(&self, connection_id: &str) -> SessionResult<Driver> {
        self.with_connection(connection_id, |state| state.driver.clone())
    }

    fn with_connection<R>(
        &self,
        connection_id: &str,
        f: impl FnOnce(&ConnectionState) -> R,
    ) -> SessionResult<R> {
        let connections = self.connections.read();
        let state = connections
            .get(connection_id)
            .ok_or_else(|| SessionError::ConnectionNotOpen(connection_id.to_string()))?;
        Ok(f(state))
    }

    fn with_connection_mut<R>(
        &self,
        connection_id: &str,
        f: impl FnOnce(&mut ConnectionState) -> R,
    ) -> SessionResult<R> {
        let mut connections = self.connections.write();
        let state = connections
            .get_mut(connection_id)
            .ok_or_else(|| SessionError::ConnectionNotOpen(connection_id.to_string()))?;
        Ok(f(state))
    }

    /// Run a tab-set mutation; schedule a write when it reports a durable change
    fn mutate_tabs<R>(
        &self,
        connection_id: &str,
        f: impl FnOnce(&mut ConnectionTabs) -> (R, bool),
    ) -> SessionResult<R> {
        let (result, snapshot) = self.with_connection_mut(connection_id, |state| {
            let (result, persist) = f(&mut state.tabs);
            (result, persist.then(|| state.tabs.to_persisted()))
        })?;

        if let Some(snapshot) = snapshot {
            self.persist_queue
                .lock()
                .schedule(connection_id, snapshot, Instant::now());
        }
        Ok(result)
    }

    // ============ Tabs ============

    pub fn tabs(&self, connection_id: &str) -> SessionResult<Vec<Tab>> {
        self.with_connection(connection_id, |state| state.tabs.tabs().to_vec())
    }

    pub fn tab(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<Tab> {
        self.with_connection(connection_id, |state| state.tabs.get(tab_id).cloned())?
            .ok_or(SessionError::TabNotFound(tab_id))
    }

    pub fn active_tab_id(&self, connection_id: &str) -> SessionResult<Uuid> {
        self.with_connection(connection_id, |state| state.tabs.active_id())
    }

    pub fn active_tab(&self, connection_id: &str) -> SessionResult<Tab> {
        let active = self.active_tab_id(connection_id)?;
        self.tab(connection_id, active)
    }

    /// Open a tab (or focus the existing tab for the same table)
    pub fn create_tab(&self, connection_id: &str, request: NewTab) -> SessionResult<Uuid> {
        self.mutate_tabs(connection_id, |tabs| (tabs.create(request), true))
    }

    pub fn close_tab(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<bool> {
        self.mutate_tabs(connection_id, |tabs| {
            let closed = tabs.close(tab_id);
            (closed, closed)
        })
    }

    pub fn close_all_tabs(&self, connection_id: &str) -> SessionResult<()> {
        self.mutate_tabs(connection_id, |tabs| {
            tabs.close_all();
            ((), true)
        })
    }

    pub fn close_other_tabs(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<bool> {
        self.mutate_tabs(connection_id, |tabs| {
            let closed = tabs.close_others(tab_id);
            (closed, closed)
        })
    }

    pub fn close_tabs_to_left(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<bool> {
        self.mutate_tabs(connection_id, |tabs| {
            let closed = tabs.close_to_left(tab_id);
            (closed, closed)
        })
    }

    pub fn close_tabs_to_right(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<bool> {
        self.mutate_tabs(connection_id, |tabs| {
            let closed = tabs.close_to_right(tab_id);
            (closed, closed)
        })
    }

    /// Merge a patch into a tab; only durable changes are persisted
    pub fn update_tab(
        &self,
        connection_id: &str,
        tab_id: Uuid,
        patch: TabPatch,
    ) -> SessionResult<bool> {
        let durable = patch.touches_durable();
        self.mutate_tabs(connection_id, |tabs| {
            let updated = tabs.update(tab_id, patch);
            (updated, updated && durable)
        })
    }

    pub fn set_active_tab(&self, connection_id: &str, tab_id: Uuid) -> SessionResult<bool> {
        self.mutate_tabs(connection_id, |tabs| {
            let focused = tabs.set_active(tab_id);
            (focused, focused)
        })
    }

    pub fn reorder_tab(
        &self,
        connection_id: &str,
        tab_id: Uuid,
        new_index: usize,
    ) -> SessionResult<bool> {
        self.mutate_tabs(connection_id, |tabs| {
            let moved = tabs.reorder(tab_id, new_index);
            (moved, moved)
        })
    }

    /// Mutate a tab's pending edits. Pending edits are never persisted.
    pub fn edit_pending<R>(
        &self,
        connection_id: &str,
        tab_id: Uuid,
        f: impl FnOnce(&mut PendingEdits) -> R,
    ) -> SessionResult<R> {
        self.with_connection_mut(connection_id, |state| {
            state.tabs.get_mut(tab_id).map(|tab| f(&mut tab.pending))
        })?
        .ok_or(SessionError::TabNotFound(tab_id))
    }

    // ============ Persistence ============

    /// Write every session whose debounce window has passed.
    ///
    /// Returns the number of sessions written. Failed writes are logged and
    /// dropped; the next change schedules a fresh snapshot.
    pub async fn flush_persistence(&self) -> usize {
        let due = self.persist_queue.lock().take_due(Instant::now());
        self.write_sessions(due).await
    }

    /// Write every scheduled session now, ignoring the debounce window
    pub async fn flush_all_persistence(&self) -> usize {
        let all = self.persist_queue.lock().take_all();
        self.write_sessions(all).await
    }

    /// Earliest moment a scheduled write becomes due
    pub fn next_persist_deadline(&self) -> Option<Instant> {
        self.persist_queue.lock().next_deadline()
    }

    pub fn pending_persist_count(&self) -> usize {
        self.persist_queue.lock().len()
    }

    async fn write_sessions(&self, sessions: Vec<(String, PersistedSession)>) -> usize {
        let mut written = 0;
        for (connection_id, session) in sessions {
            match self.storage.save(&connection_id, &session).await {
                Ok(()) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        tab_count = session.tabs.len(),
                        "persisted tab session"
                    );
                    written += 1;
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id,
                        error = %e,
                        "failed to persist tab session"
                    );
                }
            }
        }
        written
    }
}
