//! Snapshot store implementations.

use async_trait::async_trait;
use finbot_core::error::{FinbotError, Result};
use finbot_core::snapshot::SnapshotStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Process-local store; values vanish with the process.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FinbotError::validation(format!(
                "invalid snapshot key '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        tracing::debug!("Wrote snapshot {:?}", path);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
