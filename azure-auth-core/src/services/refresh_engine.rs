//! Refresh-token exchange with consent escalation

use std::sync::Arc;

use azure_auth_provider::{COMMON_TENANT, RefreshTokenRequest, Resource, Tenant, TokenExchange};

use crate::error::CoreError;
use crate::messages;
use crate::traits::ConsentOutcome;
use crate::types::{RefreshOutcome, RefreshToken, TokenRefreshResponse};

use super::{ServiceContext, TokenCache};

/// Runs one refresh attempt and caches what it yields.
pub struct TokenRefreshEngine {
    ctx: Arc<ServiceContext>,
    cache: Arc<TokenCache>,
}

impl TokenRefreshEngine {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, cache: Arc<TokenCache>) -> Self {
        Self { ctx, cache }
    }

    /// Exchange `refresh_token` for tokens scoped to `tenant` and `resource`.
    ///
    /// Without a tenant the `common` endpoint is used; without a resource the
    /// provider's default audience is issued. On success both tokens are
    /// cached under `account_id` and the expiry is recorded, or cleared when
    /// the endpoint sent none.
    pub async fn refresh(
        &self,
        account_id: &str,
        refresh_token: &RefreshToken,
        tenant: Option<&Tenant>,
        resource: Option<&Resource>,
    ) -> RefreshOutcome {
        let tenant_id = tenant.map(|t| t.id.as_str());
        let resource_id = resource.map(|r| r.id.as_str());

        let response = match self.request_tokens(refresh_token, tenant_id, resource).await {
            RefreshOutcome::Refreshed(response) => response,
            other => return other,
        };

        if let Err(e) = self
            .cache
            .save(
                account_id,
                &response.access_token,
                &response.refresh_token,
                resource_id,
                tenant_id,
            )
            .await
        {
            log::warn!("Refreshed tokens for {account_id} could not be cached: {e}");
            return RefreshOutcome::Failed(e);
        }

        self.cache
            .update_expiry(account_id, resource_id, tenant_id, response.expires_on)
            .await;

        RefreshOutcome::Refreshed(response)
    }

    async fn request_tokens(
        &self,
        refresh_token: &RefreshToken,
        tenant_id: Option<&str>,
        resource: Option<&Resource>,
    ) -> RefreshOutcome {
        let provider = &self.ctx.identity_provider;
        let tenant = tenant_id.unwrap_or(COMMON_TENANT);
        let request = RefreshTokenRequest {
            refresh_token: refresh_token.token.clone(),
            client_id: provider.settings().client_id.clone(),
            resource: resource.map(|r| r.endpoint.clone()),
        };

        log::debug!(
            "Refreshing token for tenant {tenant} (resource: {})",
            resource.map_or("default", |r| r.id.as_str())
        );

        match provider.exchange_refresh_token(tenant, &request).await {
            Ok(TokenExchange::Issued(issued)) => match TokenRefreshResponse::from_endpoint(issued) {
                Ok(response) => RefreshOutcome::Refreshed(Box::new(response)),
                Err(e) => {
                    log::error!("Token issued for tenant {tenant} could not be read: {e}");
                    RefreshOutcome::Failed(e)
                }
            },
            Ok(TokenExchange::InteractionRequired { description }) => {
                log::info!(
                    "Tenant {tenant} requires interaction: {}",
                    description.as_deref().unwrap_or("no description")
                );
                self.request_consent(tenant, resource).await
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("Token refresh for tenant {tenant} rejected: {e}");
                } else {
                    log::error!("Token refresh for tenant {tenant} failed: {e}");
                }
                RefreshOutcome::Failed(CoreError::TokenRefresh(format!(
                    "{} {e}",
                    messages::REFRESH_ACCOUNT_ERROR
                )))
            }
        }
    }

    async fn request_consent(&self, tenant: &str, resource: Option<&Resource>) -> RefreshOutcome {
        let resource_id = resource.map_or("", |r| r.id.as_str());
        let resource_endpoint = resource.map_or("", |r| r.endpoint.as_str());

        // 1. Ask before opening the consent page
        if !self.ctx.notifier.confirm_consent(tenant, resource_id).await {
            self.ctx.notifier.show_info(messages::REAUTH_PAGE_DECLINED).await;
            return RefreshOutcome::Declined;
        }

        // 2. Run the consent flow
        let outcome = match self
            .ctx
            .interactive_auth
            .prompt_for_consent(resource_endpoint, tenant)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Consent flow for tenant {tenant} failed: {e}");
                self.ctx.notifier.show_error(messages::TOKEN_RETRIEVAL_ERROR).await;
                return RefreshOutcome::Failed(CoreError::TokenRefresh(
                    messages::TOKEN_RETRIEVAL_ERROR.to_string(),
                ));
            }
        };

        // 3. Release the flow and hand back its tokens
        match outcome {
            ConsentOutcome::Granted {
                response,
                completion,
            } => {
                if completion.send(()).is_err() {
                    log::debug!("Consent flow for tenant {tenant} stopped waiting for completion");
                }
                RefreshOutcome::Refreshed(response)
            }
            ConsentOutcome::Declined => {
                log::info!("Consent for tenant {tenant} was declined");
                self.ctx.notifier.show_info(messages::REAUTH_PAGE_DECLINED).await;
                RefreshOutcome::Declined
            }
        }
    }
}
