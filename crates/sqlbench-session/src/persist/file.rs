//! One JSON file per connection

use async_trait::async_trait;
use sqlbench_core::{BenchError, Result};
use sqlbench_settings::SessionSettings;
use std::path::{Path, PathBuf};

use super::{PersistedSession, SESSION_VERSION, TabStorage};

/// Stores each connection's session as `<dir>/<connection>.json`.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// a crash mid-write leaves the previous session intact.
#[derive(Debug, Clone)]
pub struct FileTabStorage {
    dir: PathBuf,
}

impl FileTabStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage in the configured sessions directory
    pub fn from_settings(settings: &SessionSettings) -> anyhow::Result<Self> {
        Ok(Self::new(settings.sessions_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Session file for a connection.
    ///
    /// ASCII letters, digits and `-` are kept as is; every other byte is
    /// written as `_XX` hex, so distinct ids never share a file.
    pub fn session_path(&self, connection_id: &str) -> PathBuf {
        let mut file_stem = String::with_capacity(connection_id.len());
        for byte in connection_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                file_stem.push(byte as char);
            } else {
                file_stem.push_str(&format!("_{byte:02X}"));
            }
        }
        self.dir.join(format!("{}.json", file_stem))
    }
}

#[async_trait]
impl TabStorage for FileTabStorage {
    async fn load(&self, connection_id: &str) -> Result<Option<PersistedSession>> {
        let path = self.session_path(connection_id);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: PersistedSession = serde_json::from_str(&content)?;

        if session.version != SESSION_VERSION {
            tracing::warn!(
                "Session version mismatch: expected {}, got {}. Starting fresh.",
                SESSION_VERSION,
                session.version
            );
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn save(&self, connection_id: &str, session: &PersistedSession) -> Result<()> {
        let path = self.session_path(connection_id);
        tokio::fs::create_dir_all(&self.dir).await?;

        let content = serde_json::to_string_pretty(session)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            BenchError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::debug!("Saved tab session to {:?}", path);
        Ok(())
    }
}
