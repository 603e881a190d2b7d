//! Settings file utilities

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "sqlbench";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join(APP_DIR))
}

pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .context("Could not determine data directory")
        .map(|p| p.join(APP_DIR))
}

pub fn settings_file() -> Result<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

/// Directory holding one persisted tab session per connection
pub fn sessions_dir() -> Result<PathBuf> {
    data_dir().map(|p| p.join("sessions"))
}

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

pub fn ensure_directories() -> Result<()> {
    let dirs = [config_dir()?, data_dir()?, sessions_dir()?];
    for dir in dirs {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        }
    }
    Ok(())
}
