//! Account lifecycle service
//!
//! Coordinates sign-in, silent refresh, per-tenant token acquisition and
//! sign-out on top of the token cache, refresh engine and tenant resolver.
//! Failures never escape to the caller as panics: account-level problems mark
//! the account stale and hard errors are reported through the notifier.

use std::collections::HashMap;
use std::sync::Arc;

use azure_auth_provider::{AzureResource, Subscription, Tenant, TokenClaims};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{CoreError, CoreResult};
use crate::messages;
use crate::traits::InteractiveLogin;
use crate::types::{
    AccountKey, AzureAccount, RefreshOutcome, RefreshToken, SecurityTokens, TenantTokenOutcome,
    Token, TokenRefreshResponse,
};

use super::{ServiceContext, TenantResolver, TokenCache, TokenRefreshEngine};

/// Result of an interactive sign-in.
#[derive(Debug)]
pub enum LoginOutcome {
    Completed(Box<AzureAccount>),
    Cancelled,
    /// Already reported to the user.
    Failed(CoreError),
}

/// Account lifecycle service
pub struct AccountLifecycleService {
    ctx: Arc<ServiceContext>,
    cache: Arc<TokenCache>,
    engine: TokenRefreshEngine,
    resolver: TenantResolver,
    /// One in-flight operation per account id.
    account_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLifecycleService {
    /// Create the service and its token cache
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        let cache = Arc::new(TokenCache::new(ctx.credential_store.clone()));
        Self::with_cache(ctx, cache)
    }

    /// Create the service around an existing cache
    #[must_use]
    pub fn with_cache(ctx: Arc<ServiceContext>, cache: Arc<TokenCache>) -> Self {
        Self {
            engine: TokenRefreshEngine::new(ctx.clone(), cache.clone()),
            resolver: TenantResolver::new(ctx.identity_provider.clone()),
            ctx,
            cache,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    async fn lock_account(&self, account_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.account_locks.lock().await;
            locks
                .entry(account_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Forget the lock of a signed-out account unless someone else waits on it.
    ///
    /// Called while holding the account's guard, so two references remain
    /// when nobody else does: the map's and the guard's.
    async fn release_account_lock(&self, account_id: &str) {
        let mut locks = self.account_locks.lock().await;
        if locks
            .get(account_id)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            locks.remove(account_id);
        }
    }

    /// Sign in interactively and build the account.
    ///
    /// Flow: interactive login -> cache base tokens -> list tenants -> build
    /// account -> list subscriptions
    pub async fn login(&self) -> LoginOutcome {
        // 1. Interactive flow
        let response = match self.ctx.interactive_auth.login().await {
            Ok(InteractiveLogin::Completed(response)) => response,
            Ok(InteractiveLogin::Cancelled) => {
                log::info!("Sign-in was cancelled");
                self.ctx.interactive_auth.auto_oauth_cancelled().await;
                return LoginOutcome::Cancelled;
            }
            Err(e) => return self.login_failed(e).await,
        };

        let account_id = response.access_token.key.clone();
        let _guard = self.lock_account(&account_id).await;

        match self.complete_login(&account_id, &response).await {
            Ok(account) => {
                log::info!(
                    "Signed in {account_id} with {} tenant(s)",
                    account.properties.tenants.len()
                );
                LoginOutcome::Completed(Box::new(account))
            }
            Err(e) => self.login_failed(e).await,
        }
    }

    async fn complete_login(
        &self,
        account_id: &str,
        response: &TokenRefreshResponse,
    ) -> CoreResult<AzureAccount> {
        // 2. Cache the base tokens
        self.cache
            .save(
                account_id,
                &response.access_token,
                &response.refresh_token,
                None,
                None,
            )
            .await?;
        self.cache
            .update_expiry(account_id, None, None, response.expires_on)
            .await;

        // 3. Tenants
        let tenants = self.resolver.list_tenants(&response.access_token).await?;

        // 4. Account record
        let mut account = self.create_account(&response.token_claims, account_id, tenants);

        // 5. Subscriptions
        let subscriptions = self.get_subscriptions_unlocked(&mut account).await?;
        account.properties.subscriptions = Some(subscriptions);

        Ok(account)
    }

    async fn login_failed(&self, e: CoreError) -> LoginOutcome {
        if e.is_expected() {
            log::warn!("Sign-in failed: {e}");
        } else {
            log::error!("Sign-in failed: {e}");
        }
        self.ctx
            .notifier
            .show_error(&messages::login_failed(&e.to_string()))
            .await;
        LoginOutcome::Failed(e)
    }

    /// Refresh an account silently.
    ///
    /// Never fails: without a usable base refresh token, or on any error, the
    /// original account comes back with `is_stale` set.
    pub async fn refresh_access(&self, account: &AzureAccount) -> AzureAccount {
        let _guard = self.lock_account(account.account_id()).await;
        let mut old = account.clone();

        let Some(base) = self.cache.load(old.account_id(), None, None).await else {
            log::info!("No base token for {}, account is stale", old.account_id());
            old.is_stale = true;
            return old;
        };

        match self.rebuild_account(&old, &base.refresh_token).await {
            Ok(account) => account,
            Err(e) => {
                log::warn!("Refreshing {} failed: {e}", old.account_id());
                old.is_stale = true;
                self.ctx.notifier.show_error(&e.to_string()).await;
                old
            }
        }
    }

    async fn rebuild_account(
        &self,
        old: &AzureAccount,
        refresh_token: &RefreshToken,
    ) -> CoreResult<AzureAccount> {
        let response = match self
            .engine
            .refresh(old.account_id(), refresh_token, None, None)
            .await
        {
            RefreshOutcome::Refreshed(response) => response,
            RefreshOutcome::Declined => {
                return Err(CoreError::TokenRefresh(
                    messages::REFRESH_ACCOUNT_ERROR.to_string(),
                ));
            }
            RefreshOutcome::Failed(e) => return Err(e),
        };

        let tenants = self.resolver.list_tenants(&response.access_token).await?;
        let mut account =
            self.create_account(&response.token_claims, &response.access_token.key, tenants);

        let subscriptions = self.get_subscriptions_unlocked(&mut account).await?;
        account.properties.subscriptions = Some(subscriptions);

        Ok(account)
    }

    /// Bearer tokens for `resource` in every tenant of the account.
    ///
    /// Returns `None` for a stale account, an unknown resource, a missing base
    /// refresh token (the account is marked stale) or a refresh that left no
    /// cache entry behind. Tenants whose refresh fails are removed from the
    /// account and reported as dropped.
    pub async fn get_security_token(
        &self,
        account: &mut AzureAccount,
        resource: AzureResource,
    ) -> Option<SecurityTokens> {
        let _guard = self.lock_account(account.account_id()).await;
        self.get_security_token_unlocked(account, resource).await
    }

    async fn get_security_token_unlocked(
        &self,
        account: &mut AzureAccount,
        azure_resource: AzureResource,
    ) -> Option<SecurityTokens> {
        if account.is_stale {
            log::info!("Account {} is stale, no tokens fetched", account.account_id());
            return None;
        }

        let resource = self
            .ctx
            .identity_provider
            .settings()
            .find_resource(azure_resource)
            .cloned()?;
        let account_id = account.key.account_id.clone();
        let mut result = SecurityTokens::default();

        let tenants: Vec<Tenant> = account.properties.tenants.clone();
        for tenant in tenants {
            let mut cached = self
                .cache
                .load(&account_id, Some(&resource.id), Some(&tenant.id))
                .await;
            if cached.is_some()
                && !self
                    .cache
                    .is_fresh(&account_id, &resource.id, &tenant.id)
                    .await
            {
                cached = None;
            }

            let (cached, outcome) = if let Some(cached) = cached {
                (cached, TenantTokenOutcome::Cached)
            } else {
                let Some(base) = self.cache.load(&account_id, None, None).await else {
                    log::info!("Base token for {account_id} is missing, account is stale");
                    account.is_stale = true;
                    return None;
                };

                let reason = match self
                    .engine
                    .refresh(&account_id, &base.refresh_token, Some(&tenant), Some(&resource))
                    .await
                {
                    RefreshOutcome::Refreshed(_) => None,
                    RefreshOutcome::Declined => Some("consent declined".to_string()),
                    RefreshOutcome::Failed(e) => Some(e.to_string()),
                };
                if let Some(reason) = reason {
                    log::info!(
                        "Could not refresh token for tenant {}, removing it from {account_id}: {reason}",
                        tenant.id
                    );
                    account.properties.tenants.retain(|t| t.id != tenant.id);
                    result
                        .tenant_outcomes
                        .push((tenant, TenantTokenOutcome::Dropped(reason)));
                    continue;
                }

                let Some(cached) = self
                    .cache
                    .load(&account_id, Some(&resource.id), Some(&tenant.id))
                    .await
                else {
                    log::warn!("Refresh for tenant {} left no cache entry", tenant.id);
                    return None;
                };
                (cached, TenantTokenOutcome::Refreshed)
            };

            result
                .tokens
                .insert(tenant.id.clone(), Token::bearer(&cached.access_token));
            result.tenant_outcomes.push((tenant, outcome));
        }

        if let Some(subscriptions) = &account.properties.subscriptions {
            for subscription in subscriptions {
                if let Some(token) = result.tokens.get(&subscription.tenant_id).cloned() {
                    result.tokens.insert(subscription.id.clone(), token);
                }
            }
        }

        Some(result)
    }

    /// Subscriptions across every tenant of the account, in tenant order.
    ///
    /// Without any usable management token the account is marked stale and
    /// the list is empty.
    pub async fn get_subscriptions(
        &self,
        account: &mut AzureAccount,
    ) -> CoreResult<Vec<Subscription>> {
        let _guard = self.lock_account(account.account_id()).await;
        self.get_subscriptions_unlocked(account).await
    }

    async fn get_subscriptions_unlocked(
        &self,
        account: &mut AzureAccount,
    ) -> CoreResult<Vec<Subscription>> {
        let tokens = self
            .get_security_token_unlocked(account, AzureResource::ResourceManagement)
            .await;
        // Every tenant dropped counts the same as no tokens at all
        let Some(tokens) =
            tokens.filter(|t| !t.tokens.is_empty() || t.tenant_outcomes.is_empty())
        else {
            log::info!(
                "No resource management tokens for {}, account is stale",
                account.account_id()
            );
            account.is_stale = true;
            return Ok(Vec::new());
        };

        let mut subscriptions = Vec::new();
        for tenant in &account.properties.tenants {
            let Some(token) = tokens.get(&tenant.id) else {
                continue;
            };
            subscriptions.extend(self.resolver.list_subscriptions(&token.token).await?);
        }
        Ok(subscriptions)
    }

    /// Build the account record for `claims`; pure.
    #[must_use]
    pub fn create_account(
        &self,
        claims: &TokenClaims,
        key: &str,
        tenants: Vec<Tenant>,
    ) -> AzureAccount {
        AzureAccount::from_claims(
            claims,
            key,
            tenants,
            self.ctx.identity_provider.settings(),
            self.ctx.interactive_auth.auth_type(),
        )
    }

    /// Remove every cached token of one account. Errors are reported, not returned.
    pub async fn clear_credentials(&self, key: &AccountKey) {
        let guard = self.lock_account(&key.account_id).await;
        if let Err(e) = self.cache.delete_for_account(&key.account_id).await {
            log::error!("Error when removing tokens for {}: {e}", key.account_id);
            self.ctx
                .notifier
                .show_error(messages::REMOVE_FROM_CACHE_ERROR)
                .await;
        }
        self.release_account_lock(&key.account_id).await;
        drop(guard);
    }

    /// Remove every cached token of every account. Errors are reported, not returned.
    pub async fn delete_all_cache(&self) {
        if let Err(e) = self.cache.delete_all().await {
            log::error!("Error when removing all tokens: {e}");
            self.ctx
                .notifier
                .show_error(messages::REMOVE_FROM_CACHE_ERROR)
                .await;
        }
        // Locks still held or awaited stay so those callers keep serializing
        self.account_locks
            .lock()
            .await
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
