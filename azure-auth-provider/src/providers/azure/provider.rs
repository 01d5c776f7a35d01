//! `IdentityProvider` implementation for Azure

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::IdentityProvider;
use crate::types::{
    ARM_API_VERSION, ProviderSettings, RefreshTokenRequest, Subscription, TenantInfo,
    TokenExchange,
};

use super::AzureIdentityProvider;
use super::types::{ArmSubscription, ValueList};

impl AzureIdentityProvider {
    fn to_subscription(sub: ArmSubscription) -> Subscription {
        Subscription {
            id: sub.subscription_id,
            display_name: sub.display_name,
            tenant_id: sub.tenant_id,
        }
    }
}

#[async_trait]
impl IdentityProvider for AzureIdentityProvider {
    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    async fn exchange_refresh_token(
        &self,
        tenant: &str,
        request: &RefreshTokenRequest,
    ) -> Result<TokenExchange> {
        self.post_token(tenant, request).await
    }

    async fn list_tenants(&self, access_token: &str) -> Result<Vec<TenantInfo>> {
        let list: ValueList<TenantInfo> = self
            .get_arm(&format!("tenants?api-version={ARM_API_VERSION}"), access_token)
            .await?;
        Ok(list.value)
    }

    async fn list_subscriptions(&self, access_token: &str) -> Result<Vec<Subscription>> {
        let list: ValueList<ArmSubscription> = self
            .get_arm(
                &format!("subscriptions?api-version={ARM_API_VERSION}"),
                access_token,
            )
            .await?;
        Ok(list.value.into_iter().map(Self::to_subscription).collect())
    }
}
