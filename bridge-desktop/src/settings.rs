//! Settings Storage backed by a JSON file

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const SETTINGS_FILE: &str = "settings.json";

/// JSON-file settings store
///
/// Keeps every entry in memory and rewrites the whole file on each change:
/// - One flat JSON object of string values
/// - Writes go to a sibling temp file first, then replace the original
/// - An unreadable or corrupt file opens as an empty store
pub struct FileSettingsStore {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSettingsStore {
    /// Open the store at `path`, loading any existing entries.
    ///
    /// The file and its directory are created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = ?path, error = %err, "Settings file is corrupt; starting empty");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(BridgeError::Io(err)),
        };

        debug!(path = ?path, entries = entries.len(), "Opened settings file");

        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Create a store that never touches the disk (for testing)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// `<data dir>/<app>/settings.json`, if the platform has a data directory.
    pub fn default_path(app: &str) -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(app).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let json = serde_json::to_vec_pretty(entries).map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to encode settings: {}", e))
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(BridgeError::Io)?;
        tokio::fs::rename(&tmp, path).await.map_err(BridgeError::Io)?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next).await?;
        *entries = next;

        debug!(key = key, "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;

        debug!(key = key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        self.flush(&BTreeMap::new()).await?;
        entries.clear();

        debug!("Cleared all settings");
        Ok(())
    }
}
