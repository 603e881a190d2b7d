//! sqlbench Schema - per-connection schema metadata cache
//!
//! The cache holds one snapshot of tables, columns and foreign keys per
//! connection. A snapshot is reused only while it matches the requested
//! schema version and is younger than the freshness window; anything else is
//! refetched through the backend and replaces the entry.

mod cache;

pub use cache::{CachedSchema, SCHEMA_CACHE_TTL, SchemaCache, should_use_cached_schema};

// Re-export core schema types that users will cache
pub use sqlbench_core::{ForeignKey, TableColumn, TableSchema};
