//! Expiry side-table for cached tokens

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::utils::time::{is_fresh_at, now_epoch_millis};

/// Epoch-seconds expiry per `(account, tenant, resource)`.
///
/// Written after every successful refresh and only read when deciding
/// freshness.
#[derive(Debug, Default)]
pub struct ExpiryIndex {
    entries: RwLock<HashMap<String, i64>>,
}

impl ExpiryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `{account}_{tenant}_{resource}`
    #[must_use]
    pub fn index_key(account_id: &str, tenant_id: &str, resource_id: &str) -> String {
        format!("{account_id}_{tenant_id}_{resource_id}")
    }

    pub async fn record(&self, account_id: &str, tenant_id: &str, resource_id: &str, expires_on: i64) {
        let key = Self::index_key(account_id, tenant_id, resource_id);
        log::debug!("Recording expiry {expires_on} for {key}");
        self.entries.write().await.insert(key, expires_on);
    }

    /// Drop one entry; the token it described counts as expired again.
    pub async fn forget(&self, account_id: &str, tenant_id: &str, resource_id: &str) {
        let key = Self::index_key(account_id, tenant_id, resource_id);
        if self.entries.write().await.remove(&key).is_some() {
            log::debug!("Forgot expiry for {key}");
        }
    }

    pub async fn get(&self, account_id: &str, tenant_id: &str, resource_id: &str) -> Option<i64> {
        self.entries
            .read()
            .await
            .get(&Self::index_key(account_id, tenant_id, resource_id))
            .copied()
    }

    /// Whether the token has at least five minutes left.
    ///
    /// No recorded expiry counts as expired.
    pub async fn is_fresh(&self, account_id: &str, tenant_id: &str, resource_id: &str) -> bool {
        self.is_fresh_at(account_id, tenant_id, resource_id, now_epoch_millis())
            .await
    }

    pub(crate) async fn is_fresh_at(
        &self,
        account_id: &str,
        tenant_id: &str,
        resource_id: &str,
        now_millis: i64,
    ) -> bool {
        let expires_on = self.get(account_id, tenant_id, resource_id).await;
        if expires_on.is_none() {
            log::info!(
                "Assuming expired token for tenant {tenant_id}: no expiration recorded (expected on first use)"
            );
        }
        is_fresh_at(expires_on, now_millis)
    }

    /// Drop every entry recorded for `account_id`.
    pub async fn forget_account(&self, account_id: &str) {
        let prefix = format!("{account_id}_");
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(&prefix));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
