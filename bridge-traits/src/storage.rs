//! Settings Storage Abstraction
//!
//! Provides a platform-agnostic trait for durable key-value storage plus an
//! in-memory implementation used by tests and headless hosts.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{
    error::{BridgeError, Result},
    platform::PlatformSendSync,
};

/// Key-value settings storage trait
///
/// Abstracts platform-specific durable storage:
/// - Web: `localStorage`
/// - Desktop: a JSON settings file in the user's data directory
/// - Mobile: UserDefaults / SharedPreferences
///
/// Values are stored as strings, mirroring the lowest common denominator
/// (`localStorage`). Typed accessors are provided on top of the string API.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_mode(store: &dyn SettingsStore) -> Result<()> {
///     store.set_string("display-mode", "mini").await?;
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SettingsStore: PlatformSendSync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_string(key, if value { "true" } else { "false" })
            .await
    }

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get_string(key).await? {
            Some(value) => match value.as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                other => Err(BridgeError::OperationFailed(format!(
                    "parse bool for {key}: {other}"
                ))),
            },
            None => Ok(None),
        }
    }

    /// Store a floating-point value
    async fn set_f64(&self, key: &str, value: f64) -> Result<()> {
        self.set_string(key, &value.to_string()).await
    }

    /// Retrieve a floating-point value
    async fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.get_string(key).await? {
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|err| BridgeError::OperationFailed(format!("parse f64 for {key}: {err}"))),
            None => Ok(None),
        }
    }
}

/// Volatile settings store backed by a sorted map.
///
/// Useful for tests and for hosts where durable storage is unavailable; the
/// player then simply starts from defaults on every launch.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| BridgeError::OperationFailed("settings map poisoned".to_string()))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_operations() {
        let store = MemorySettingsStore::new();

        store.set_string("display-mode", "mini").await.unwrap();
        assert_eq!(
            store.get_string("display-mode").await.unwrap(),
            Some("mini".to_string())
        );
        assert!(store.has_key("display-mode").await.unwrap());

        store.delete("display-mode").await.unwrap();
        assert_eq!(store.get_string("display-mode").await.unwrap(), None);
        assert!(!store.has_key("display-mode").await.unwrap());
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let store = MemorySettingsStore::new();

        store.set_bool("muted", true).await.unwrap();
        assert_eq!(store.get_bool("muted").await.unwrap(), Some(true));

        store.set_f64("volume", 0.25).await.unwrap();
        assert_eq!(store.get_f64("volume").await.unwrap(), Some(0.25));

        store.set_string("volume", "loud").await.unwrap();
        assert!(store.get_f64("volume").await.is_err());
    }

    #[tokio::test]
    async fn test_preloaded_keys_are_sorted() {
        let store = MemorySettingsStore::with_entries([("b", "2"), ("a", "1")]);
        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);

        store.clear_all().await.unwrap();
        assert!(store.list_keys().await.unwrap().is_empty());
    }
}
