//! Token cache over the credential store
//!
//! Each cache entry is an access/refresh pair stored as two JSON values:
//! `{account}_access_{resource}_{tenant}` and `{account}_refresh_{resource}_{tenant}`.
//! Missing resource or tenant ids are stored as empty strings.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{CoreError, CoreResult};
use crate::messages;
use crate::traits::CredentialStore;
use crate::types::{AccessToken, CachedTokens, RefreshToken};

use super::ExpiryIndex;

/// Access/refresh token cache plus its expiry index.
pub struct TokenCache {
    store: Arc<dyn CredentialStore>,
    expiry: ExpiryIndex,
}

impl TokenCache {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            expiry: ExpiryIndex::new(),
        }
    }

    /// Storage keys for the access and refresh halves of an entry.
    #[must_use]
    pub fn entry_keys(
        account_id: &str,
        resource_id: Option<&str>,
        tenant_id: Option<&str>,
    ) -> (String, String) {
        let resource_id = resource_id.unwrap_or_default();
        let tenant_id = tenant_id.unwrap_or_default();
        (
            format!("{account_id}_access_{resource_id}_{tenant_id}"),
            format!("{account_id}_refresh_{resource_id}_{tenant_id}"),
        )
    }

    /// Persist a token pair.
    ///
    /// Fails with `InvalidToken` when either token is empty or the access
    /// token has no key, or when the store rejects the write.
    pub async fn save(
        &self,
        account_id: &str,
        access_token: &AccessToken,
        refresh_token: &RefreshToken,
        resource_id: Option<&str>,
        tenant_id: Option<&str>,
    ) -> CoreResult<()> {
        if access_token.token.is_empty()
            || refresh_token.token.is_empty()
            || access_token.key.is_empty()
        {
            return Err(CoreError::InvalidToken(messages::ADD_TO_CACHE_ERROR.to_string()));
        }

        let (access_key, refresh_key) = Self::entry_keys(account_id, resource_id, tenant_id);
        let access_json = serde_json::to_string(access_token)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        let refresh_json = serde_json::to_string(refresh_token)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;

        let write = async {
            self.store.save_credential(&access_key, &access_json).await?;
            self.store.save_credential(&refresh_key, &refresh_json).await
        };
        write.await.map_err(|e| {
            log::error!("Error when storing tokens for {account_id}: {e}");
            CoreError::InvalidToken(messages::ADD_TO_CACHE_ERROR.to_string())
        })
    }

    /// Read a token pair. Any miss, parse failure or empty field is `None`.
    pub async fn load(
        &self,
        account_id: &str,
        resource_id: Option<&str>,
        tenant_id: Option<&str>,
    ) -> Option<CachedTokens> {
        let (access_key, refresh_key) = Self::entry_keys(account_id, resource_id, tenant_id);

        let access_token: AccessToken = self.read_json(&access_key).await?;
        let refresh_token: RefreshToken = self.read_json(&refresh_key).await?;

        if refresh_token.token.is_empty() || refresh_token.key.is_empty() {
            return None;
        }
        if access_token.token.is_empty() || access_token.key.is_empty() {
            return None;
        }

        Some(CachedTokens {
            access_token,
            refresh_token,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_credential(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Failed to read cache entry {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("Ignoring unparsable cache entry {key}: {e}");
                None
            }
        }
    }

    /// Clear every entry whose key starts with `account_id`.
    pub async fn delete_for_account(&self, account_id: &str) -> CoreResult<()> {
        let entries = self.store.find_credentials(account_id).await?;
        log::info!("Removing {} cache entries for account {account_id}", entries.len());
        for entry in entries {
            self.store.clear_credential(&entry.account).await?;
        }
        self.expiry.forget_account(account_id).await;
        Ok(())
    }

    /// Clear every entry of every account.
    pub async fn delete_all(&self) -> CoreResult<()> {
        let entries = self.store.find_credentials("").await?;
        log::info!("Removing all {} cache entries", entries.len());
        for entry in entries {
            self.store.clear_credential(&entry.account).await?;
        }
        self.expiry.clear().await;
        Ok(())
    }

    /// Record the expiry of a freshly cached entry.
    pub async fn record_expiry(
        &self,
        account_id: &str,
        resource_id: Option<&str>,
        tenant_id: Option<&str>,
        expires_on: i64,
    ) {
        self.expiry
            .record(
                account_id,
                tenant_id.unwrap_or_default(),
                resource_id.unwrap_or_default(),
                expires_on,
            )
            .await;
    }

    /// Store the expiry of a freshly cached entry, or drop any older one when
    /// the endpoint sent none.
    pub async fn update_expiry(
        &self,
        account_id: &str,
        resource_id: Option<&str>,
        tenant_id: Option<&str>,
        expires_on: Option<i64>,
    ) {
        match expires_on {
            Some(expires_on) => {
                self.record_expiry(account_id, resource_id, tenant_id, expires_on)
                    .await;
            }
            None => {
                log::info!("No expiry sent for a token of {account_id}, it will be refreshed on next use");
                self.expiry
                    .forget(
                        account_id,
                        tenant_id.unwrap_or_default(),
                        resource_id.unwrap_or_default(),
                    )
                    .await;
            }
        }
    }

    /// Whether a cached entry still has at least five minutes left.
    pub async fn is_fresh(&self, account_id: &str, resource_id: &str, tenant_id: &str) -> bool {
        self.expiry.is_fresh(account_id, tenant_id, resource_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockCredentialStore, access_token, refresh_token};
    use crate::traits::InMemoryCredentialStore;

    fn cache() -> (Arc<InMemoryCredentialStore>, TokenCache) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let cache = TokenCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let (_, cache) = cache();
        let at = access_token("a@b.com", "at-1");
        let rt = refresh_token("a@b.com", "rt-1");

        cache
            .save("acc", &at, &rt, Some("marm"), Some("t1"))
            .await
            .unwrap();

        let loaded = cache.load("acc", Some("marm"), Some("t1")).await.unwrap();
        assert_eq!(loaded.access_token, at);
        assert_eq!(loaded.refresh_token, rt);
        assert!(cache.load("acc", None, None).await.is_none());
    }

    #[tokio::test]
    async fn entries_use_composite_keys() {
        let (store, cache) = cache();
        cache
            .save(
                "acc",
                &access_token("k", "at"),
                &refresh_token("k", "rt"),
                None,
                Some("t1"),
            )
            .await
            .unwrap();

        assert!(store.get_credential("acc_access__t1").await.unwrap().is_some());
        assert!(store.get_credential("acc_refresh__t1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_rejects_empty_fields() {
        let (store, cache) = cache();
        let cases = [
            (access_token("k", ""), refresh_token("k", "rt")),
            (access_token("k", "at"), refresh_token("k", "")),
            (access_token("", "at"), refresh_token("k", "rt")),
        ];
        for (at, rt) in cases {
            let err = cache.save("acc", &at, &rt, None, None).await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidToken(ref m) if m == messages::ADD_TO_CACHE_ERROR));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn load_is_a_soft_miss() {
        let (store, cache) = cache();
        assert!(cache.load("never", Some("marm"), Some("t1")).await.is_none());

        store.save_credential("acc_access__", "not json").await.unwrap();
        store
            .save_credential("acc_refresh__", r#"{"key":"k","token":"rt"}"#)
            .await
            .unwrap();
        assert!(cache.load("acc", None, None).await.is_none());

        store
            .save_credential("acc_access__", r#"{"key":"","token":"at"}"#)
            .await
            .unwrap();
        assert!(cache.load("acc", None, None).await.is_none());

        store
            .save_credential("acc_access__", r#"{"key":"k","token":"at"}"#)
            .await
            .unwrap();
        assert!(cache.load("acc", None, None).await.is_some());
    }

    #[tokio::test]
    async fn store_failures_are_reported_as_cache_errors() {
        let store = Arc::new(MockCredentialStore::new());
        let cache = TokenCache::new(store.clone());
        store.set_save_error(Some("locked".into())).await;

        let err = cache
            .save("acc", &access_token("k", "at"), &refresh_token("k", "rt"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidToken(_)));

        store.set_save_error(None).await;
        cache
            .save("acc", &access_token("k", "at"), &refresh_token("k", "rt"), None, None)
            .await
            .unwrap();
        store.set_get_error(Some("locked".into())).await;
        assert!(cache.load("acc", None, None).await.is_none());
    }

    #[tokio::test]
    async fn delete_for_account_clears_prefix_and_expiry() {
        let (store, cache) = cache();
        for (account, tenant) in [("alice", "t1"), ("alice", "t2"), ("bob", "t1")] {
            cache
                .save(
                    account,
                    &access_token("k", "at"),
                    &refresh_token("k", "rt"),
                    Some("marm"),
                    Some(tenant),
                )
                .await
                .unwrap();
            cache
                .record_expiry(account, Some("marm"), Some(tenant), i64::MAX / 2000)
                .await;
        }

        cache.delete_for_account("alice").await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(cache.load("bob", Some("marm"), Some("t1")).await.is_some());
        assert!(!cache.is_fresh("alice", "marm", "t1").await);
        assert!(cache.is_fresh("bob", "marm", "t1").await);

        cache.delete_all().await.unwrap();
        assert!(store.is_empty().await);
        assert!(!cache.is_fresh("bob", "marm", "t1").await);
    }
}
