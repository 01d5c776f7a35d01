//! Tenant and subscription discovery

use std::sync::Arc;

use azure_auth_provider::{IdentityProvider, ProviderError, Subscription, Tenant, TenantInfo};

use crate::error::{CoreError, CoreResult};
use crate::messages;
use crate::types::AccessToken;

/// Lists tenants and subscriptions through the management API.
pub struct TenantResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl TenantResolver {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Tenants visible to `access_token`, home tenant first.
    ///
    /// Each tenant's `user_id` is the token's key. Fails as a whole; never
    /// returns a partial list.
    pub async fn list_tenants(&self, access_token: &AccessToken) -> CoreResult<Vec<Tenant>> {
        let infos = self
            .provider
            .list_tenants(&access_token.token)
            .await
            .map_err(|e| {
                log_listing_failure("tenants", &e);
                CoreError::TenantList(e.to_string())
            })?;

        let mut tenants: Vec<Tenant> = infos
            .into_iter()
            .map(|info| to_tenant(info, &access_token.key))
            .collect();
        move_home_tenant_first(&mut tenants);

        log::info!("Resolved {} tenant(s) for {}", tenants.len(), access_token.key);
        Ok(tenants)
    }

    /// Subscriptions visible to one tenant-scoped management token.
    pub async fn list_subscriptions(&self, token: &str) -> CoreResult<Vec<Subscription>> {
        self.provider.list_subscriptions(token).await.map_err(|e| {
            log_listing_failure("subscriptions", &e);
            CoreError::SubscriptionList(e.to_string())
        })
    }
}

fn to_tenant(info: TenantInfo, user_id: &str) -> Tenant {
    Tenant {
        id: info.tenant_id,
        display_name: info
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| messages::DEFAULT_TENANT_NAME.to_string()),
        user_id: user_id.to_string(),
        tenant_category: info.tenant_category,
    }
}

fn log_listing_failure(what: &str, e: &ProviderError) {
    if e.is_expected() {
        log::warn!("Listing {what} was rejected: {e}");
    } else {
        log::error!("Listing {what} failed: {e}");
    }
}

/// Move the first home tenant to index 0; the rest keep their order.
pub fn move_home_tenant_first(tenants: &mut [Tenant]) {
    if let Some(index) = tenants.iter().position(Tenant::is_home) {
        tenants[..=index].rotate_right(1);
    }
}
