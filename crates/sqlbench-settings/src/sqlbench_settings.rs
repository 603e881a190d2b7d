//! sqlbench Settings
//!
//! Provides session engine settings with persistence:
//! - Debounce delay for tab persistence
//! - Default page size for paged reads
//! - Storage location for persisted tab sessions
//!
//! Also hosts the logging setup shared by binaries embedding the engine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod logging;
mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Quiet period before a tab-set change is written to storage
    pub persist_debounce_ms: u64,
    /// Rows per page for table browsing and paged query results
    pub default_page_size: u32,
    /// Overrides the default sessions directory when set
    pub storage_dir: Option<PathBuf>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            persist_debounce_ms: 500,
            default_page_size: 100,
            storage_dir: None,
        }
    }
}

impl SessionSettings {
    /// Load settings from the user config directory, falling back to defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    /// Directory for persisted tab sessions
    pub fn sessions_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => sessions_dir(),
        }
    }
}
