//! Schema cache keyed by connection id

use parking_lot::RwLock;
use sqlbench_core::{DatabaseBackend, Result, TableColumn, TableSchema, find_table};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Freshness window for a cached snapshot
pub const SCHEMA_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached schema snapshot for one connection
#[derive(Debug, Clone)]
pub struct CachedSchema {
    pub tables: Arc<Vec<TableSchema>>,
    /// Schema version the snapshot was fetched at
    pub version: u64,
    pub cached_at: Instant,
}

impl CachedSchema {
    pub fn new(tables: Vec<TableSchema>, version: u64) -> Self {
        Self {
            tables: Arc::new(tables),
            version,
            cached_at: Instant::now(),
        }
    }
}

/// Whether `entry` can be served for a request at `now`.
///
/// The version must match when one is requested, and the entry must be
/// strictly younger than `ttl`.
pub fn should_use_cached_schema(
    entry: Option<&CachedSchema>,
    requested_version: Option<u64>,
    now: Instant,
    ttl: Duration,
) -> bool {
    let Some(entry) = entry else {
        return false;
    };
    if requested_version.is_some_and(|v| v != entry.version) {
        return false;
    }
    now.saturating_duration_since(entry.cached_at) < ttl
}

/// Process-wide schema cache
///
/// Entries are replaced wholesale on refresh. No lock is held while a fetch is
/// in flight, so concurrent readers keep seeing the previous snapshot.
pub struct SchemaCache {
    /// Cache per connection ID
    cache: RwLock<HashMap<String, CachedSchema>>,

    /// Cache TTL
    ttl: Duration,
}

impl SchemaCache {
    /// Create a new schema cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Snapshot of the raw entry, fresh or not
    pub fn entry(&self, connection_id: &str) -> Option<CachedSchema> {
        self.cache.read().get(connection_id).cloned()
    }

    /// Cached tables if the entry is usable for `version` right now
    pub fn get_fresh(
        &self,
        connection_id: &str,
        version: Option<u64>,
    ) -> Option<Arc<Vec<TableSchema>>> {
        let cache = self.cache.read();
        let entry = cache.get(connection_id);
        if should_use_cached_schema(entry, version, Instant::now(), self.ttl) {
            tracing::debug!(connection_id = %connection_id, "cache hit for schema");
            entry.map(|e| Arc::clone(&e.tables))
        } else {
            tracing::debug!(connection_id = %connection_id, ?version, "cache miss for schema");
            None
        }
    }

    /// Return the cached snapshot or fetch a fresh one through the backend.
    ///
    /// A fetched snapshot is stored under the requested version (0 when none
    /// was requested).
    #[tracing::instrument(skip(self, backend))]
    pub async fn get(
        &self,
        backend: &dyn DatabaseBackend,
        connection_id: &str,
        version: Option<u64>,
    ) -> Result<Arc<Vec<TableSchema>>> {
        if let Some(tables) = self.get_fresh(connection_id, version) {
            return Ok(tables);
        }

        let tables = backend.get_schema_snapshot(connection_id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch schema snapshot");
            e
        })?;
        Ok(self.store(connection_id, tables, version.unwrap_or(0)))
    }

    /// Replace the entry for a connection
    pub fn store(
        &self,
        connection_id: &str,
        tables: Vec<TableSchema>,
        version: u64,
    ) -> Arc<Vec<TableSchema>> {
        tracing::debug!(
            connection_id = %connection_id,
            table_count = tables.len(),
            version,
            "caching schema snapshot"
        );
        let entry = CachedSchema::new(tables, version);
        let tables = Arc::clone(&entry.tables);
        self.cache.write().insert(connection_id.to_string(), entry);
        tables
    }

    /// Look up one table in the cached snapshot, fresh or not.
    ///
    /// `None` also covers a bare name that exists in more than one schema.
    pub fn table(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> Option<TableSchema> {
        self.cache
            .read()
            .get(connection_id)
            .and_then(|c| find_table(&c.tables, table, schema).cloned())
    }

    /// Columns of one table from the cached snapshot
    pub fn table_columns(
        &self,
        connection_id: &str,
        table: &str,
        schema: Option<&str>,
    ) -> Option<Vec<TableColumn>> {
        self.table(connection_id, table, schema).map(|t| t.columns)
    }

    /// Invalidate cache for a connection
    pub fn invalidate(&self, connection_id: &str) {
        tracing::info!(connection_id = %connection_id, "invalidating schema cache");
        self.cache.write().remove(connection_id);
    }

    /// Clear all caches
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        tracing::info!(cache_entries = cache.len(), "clearing all schema caches");
        cache.clear();
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(SCHEMA_CACHE_TTL)
    }
}
