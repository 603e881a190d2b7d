use async_trait::async_trait;
use parking_lot::RwLock;
use sqlbench_core::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{PersistedSession, TabStorage};

/// In-process storage, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryTabStorage {
    sessions: RwLock<HashMap<String, PersistedSession>>,
    saves: AtomicUsize,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, connection_id: impl Into<String>, session: PersistedSession) -> Self {
        self.sessions.write().insert(connection_id.into(), session);
        self
    }

    /// Last saved session for a connection
    pub fn get(&self, connection_id: &str) -> Option<PersistedSession> {
        self.sessions.read().get(connection_id).cloned()
    }

    /// Number of writes performed so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabStorage for MemoryTabStorage {
    async fn load(&self, connection_id: &str) -> Result<Option<PersistedSession>> {
        Ok(self.get(connection_id))
    }

    async fn save(&self, connection_id: &str, session: &PersistedSession) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.sessions
            .write()
            .insert(connection_id.to_string(), session.clone());
        Ok(())
    }
}
