//! Credential store abstract Trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;

/// One stored secret as returned by a prefix search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Full storage key.
    pub account: String,
    pub password: String,
}

/// Opaque key/value secret storage shared by every account operation.
///
/// Implementations must tolerate concurrent calls.
///
/// Platform implementations:
/// - `InMemoryCredentialStore` (this crate)
/// - `KeyringCredentialStore` (`azure-auth-app`, `keyring-store` feature)
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Write a value, replacing any previous one.
    ///
    /// # Arguments
    /// * `key` - Storage key
    /// * `value` - Serialized secret
    async fn save_credential(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Read a value.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Entry exists
    /// * `Ok(None)` - Entry does not exist
    async fn get_credential(&self, key: &str) -> CoreResult<Option<String>>;

    /// All entries whose key starts with `prefix`. An empty prefix matches everything.
    async fn find_credentials(&self, prefix: &str) -> CoreResult<Vec<CredentialEntry>>;

    /// Remove an entry.
    ///
    /// # Returns
    /// * `Ok(true)` - Entry existed and was removed
    async fn clear_credential(&self, key: &str) -> CoreResult<bool>;
}

/// In-memory credential store
///
/// Default implementation, available on all platforms. Nothing survives a restart.
#[derive(Clone)]
pub struct InMemoryCredentialStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn save_credential(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_credential(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn find_credentials(&self, prefix: &str) -> CoreResult<Vec<CredentialEntry>> {
        let entries = self.entries.read().await;
        let mut found: Vec<CredentialEntry> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| CredentialEntry {
                account: key.clone(),
                password: value.clone(),
            })
            .collect();
        found.sort_by(|a, b| a.account.cmp(&b.account));
        Ok(found)
    }

    async fn clear_credential(&self, key: &str) -> CoreResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
