//! Keyring-based credential store.
//!
//! Uses the system keychain (macOS Keychain, Windows Credential Manager,
//! Linux Secret Service) via the `keyring` crate. All cache entries live in a
//! single JSON object so prefix searches need only one keychain read.

use async_trait::async_trait;
use keyring::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use azure_auth_core::error::{CoreError, CoreResult};
use azure_auth_core::traits::{CredentialEntry, CredentialStore};

const SERVICE_NAME: &str = "azure-auth";
const DEFAULT_ENTRY_NAME: &str = "token-cache";

type EntryMap = BTreeMap<String, String>;

/// Keyring-based credential store.
pub struct KeyringCredentialStore {
    entry_name: String,
    cache: Arc<RwLock<Option<EntryMap>>>,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::with_entry_name(DEFAULT_ENTRY_NAME)
    }

    /// Store under a different keychain entry, e.g. one per cloud.
    pub fn with_entry_name(entry_name: &str) -> Self {
        Self {
            entry_name: entry_name.to_string(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    fn get_entry(entry_name: &str) -> CoreResult<Entry> {
        Entry::new(SERVICE_NAME, entry_name).map_err(|e| CoreError::CredentialError(e.to_string()))
    }

    fn read_all_sync(entry_name: &str) -> CoreResult<EntryMap> {
        let entry = Self::get_entry(entry_name)?;
        let json = match entry.get_password() {
            Ok(json) => json,
            Err(keyring::Error::NoEntry) => return Ok(EntryMap::new()),
            Err(e) => return Err(CoreError::CredentialError(e.to_string())),
        };
        if json.trim().is_empty() {
            return Ok(EntryMap::new());
        }
        serde_json::from_str(&json).map_err(|e| CoreError::SerializationError(e.to_string()))
    }

    fn write_all_sync(entry_name: &str, entries: &EntryMap) -> CoreResult<()> {
        let json = serde_json::to_string(entries)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        Self::get_entry(entry_name)?
            .set_password(&json)
            .map_err(|e| CoreError::CredentialError(e.to_string()))
    }

    async fn load_all(&self) -> CoreResult<EntryMap> {
        {
            let cache = self.cache.read().await;
            if let Some(ref entries) = *cache {
                return Ok(entries.clone());
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(ref entries) = *cache {
            return Ok(entries.clone());
        }

        let entry_name = self.entry_name.clone();
        let entries = tokio::task::spawn_blocking(move || {
            log::debug!("Loading token cache from Keychain");
            Self::read_all_sync(&entry_name)
        })
        .await
        .map_err(|e| CoreError::CredentialError(format!("Task join error: {e}")))??;

        *cache = Some(entries.clone());
        log::info!("Loaded {} cache entries from Keychain", entries.len());
        Ok(entries)
    }

    /// Read-modify-write under the cache lock.
    async fn update<F>(&self, apply: F) -> CoreResult<bool>
    where
        F: FnOnce(&mut EntryMap) -> bool + Send,
    {
        let mut cache = self.cache.write().await;

        let mut entries = match cache.take() {
            Some(entries) => entries,
            None => {
                let entry_name = self.entry_name.clone();
                tokio::task::spawn_blocking(move || Self::read_all_sync(&entry_name))
                    .await
                    .map_err(|e| CoreError::CredentialError(format!("Task join error: {e}")))??
            }
        };

        let changed = apply(&mut entries);
        if changed {
            let entry_name = self.entry_name.clone();
            let to_save = entries.clone();
            // On failure the cache stays empty and the next call reloads
            tokio::task::spawn_blocking(move || Self::write_all_sync(&entry_name, &to_save))
                .await
                .map_err(|e| CoreError::CredentialError(format!("Task join error: {e}")))??;
        }

        *cache = Some(entries);
        Ok(changed)
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn save_credential(&self, key: &str, value: &str) -> CoreResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |entries| {
            entries.insert(key, value);
            true
        })
        .await?;
        Ok(())
    }

    async fn get_credential(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.load_all().await?.get(key).cloned())
    }

    async fn find_credentials(&self, prefix: &str) -> CoreResult<Vec<CredentialEntry>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(account, password)| CredentialEntry { account, password })
            .collect())
    }

    async fn clear_credential(&self, key: &str) -> CoreResult<bool> {
        let key = key.to_string();
        let removed = self
            .update(move |entries| entries.remove(&key).is_some())
            .await?;
        Ok(removed)
    }
}
