//! Test helpers
//!
//! Mock collaborators and factory functions for service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use azure_auth_provider::{
    AzureCloud, IdentityProvider, ProviderError, ProviderSettings, RefreshTokenRequest,
    Subscription, Tenant, TenantInfo, TokenEndpointResponse, TokenExchange,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::sync::{Mutex, RwLock, oneshot};

use crate::error::{CoreError, CoreResult};
use crate::services::{AccountLifecycleService, ServiceContext, TokenCache};
use crate::traits::{
    ConsentOutcome, CredentialEntry, CredentialStore, InteractiveAuth, InteractiveLogin,
    UserNotifier,
};
use crate::types::{AccessToken, AzureAuthType, RefreshToken, TokenRefreshResponse};

// ===== Builders =====

/// Unsigned JWT carrying the given JSON payload.
pub fn make_jwt(payload: &serde_json::Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes())
    )
}

pub fn access_token(key: &str, token: &str) -> AccessToken {
    AccessToken {
        key: key.to_string(),
        token: token.to_string(),
    }
}

pub fn refresh_token(key: &str, token: &str) -> RefreshToken {
    RefreshToken {
        key: key.to_string(),
        token: token.to_string(),
    }
}

pub fn tenant(id: &str, category: Option<&str>) -> Tenant {
    Tenant {
        id: id.to_string(),
        display_name: format!("Tenant {id}"),
        user_id: "ann@contoso.com".to_string(),
        tenant_category: category.map(str::to_string),
    }
}

pub fn subscription(id: &str, tenant_id: &str) -> Subscription {
    Subscription {
        id: id.to_string(),
        display_name: format!("Subscription {id}"),
        tenant_id: tenant_id.to_string(),
    }
}

// ===== MockCredentialStore =====

pub struct MockCredentialStore {
    entries: RwLock<HashMap<String, String>>,
    /// If Some, writes fail with this message
    save_error: RwLock<Option<String>>,
    /// If Some, reads fail with this message
    get_error: RwLock<Option<String>>,
    /// If Some, prefix searches fail with this message
    find_error: RwLock<Option<String>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            save_error: RwLock::new(None),
            get_error: RwLock::new(None),
            find_error: RwLock::new(None),
        }
    }

    pub async fn set_save_error(&self, err: Option<String>) {
        *self.save_error.write().await = err;
    }

    pub async fn set_get_error(&self, err: Option<String>) {
        *self.get_error.write().await = err;
    }

    pub async fn set_find_error(&self, err: Option<String>) {
        *self.find_error.write().await = err;
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn save_credential(&self, key: &str, value: &str) -> CoreResult<()> {
        if let Some(ref msg) = *self.save_error.read().await {
            return Err(CoreError::CredentialError(msg.clone()));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_credential(&self, key: &str) -> CoreResult<Option<String>> {
        if let Some(ref msg) = *self.get_error.read().await {
            return Err(CoreError::CredentialError(msg.clone()));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn find_credentials(&self, prefix: &str) -> CoreResult<Vec<CredentialEntry>> {
        if let Some(ref msg) = *self.find_error.read().await {
            return Err(CoreError::CredentialError(msg.clone()));
        }
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| CredentialEntry {
                account: key.clone(),
                password: value.clone(),
            })
            .collect())
    }

    async fn clear_credential(&self, key: &str) -> CoreResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

// ===== MockIdentityProvider =====

/// Scripted token endpoint answer for one tenant.
#[derive(Debug, Clone)]
pub enum ScriptedExchange {
    Issued(TokenEndpointResponse),
    InteractionRequired,
    Error(ProviderError),
}

impl ScriptedExchange {
    pub fn issued(access_token: &str, refresh_token: &str, expires_on: i64) -> Self {
        Self::Issued(TokenEndpointResponse {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_on: expires_on.to_string(),
            token_type: Some("Bearer".to_string()),
            resource: None,
        })
    }
}

pub struct MockIdentityProvider {
    settings: ProviderSettings,
    /// tenant -> answer; unscripted tenants are rejected
    exchanges: RwLock<HashMap<String, ScriptedExchange>>,
    requests: RwLock<Vec<(String, RefreshTokenRequest)>>,
    tenants: RwLock<Result<Vec<TenantInfo>, ProviderError>>,
    /// bearer token -> answer; unscripted tokens list nothing
    subscriptions: RwLock<HashMap<String, Result<Vec<Subscription>, ProviderError>>>,
    listing_tokens: RwLock<Vec<String>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            settings: AzureCloud::Public.settings(),
            exchanges: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
            tenants: RwLock::new(Ok(Vec::new())),
            subscriptions: RwLock::new(HashMap::new()),
            listing_tokens: RwLock::new(Vec::new()),
        }
    }

    pub fn settings_clone(&self) -> ProviderSettings {
        self.settings.clone()
    }

    pub async fn script(&self, tenant: &str, exchange: ScriptedExchange) {
        self.exchanges
            .write()
            .await
            .insert(tenant.to_string(), exchange);
    }

    pub async fn requests(&self) -> Vec<(String, RefreshTokenRequest)> {
        self.requests.read().await.clone()
    }

    pub async fn set_tenants(&self, tenants: Result<Vec<TenantInfo>, ProviderError>) {
        *self.tenants.write().await = tenants;
    }

    pub async fn set_subscriptions(
        &self,
        token: &str,
        subscriptions: Result<Vec<Subscription>, ProviderError>,
    ) {
        self.subscriptions
            .write()
            .await
            .insert(token.to_string(), subscriptions);
    }

    /// Bearer tokens passed to tenant listings, in call order.
    pub async fn listing_tokens(&self) -> Vec<String> {
        self.listing_tokens.read().await.clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    async fn exchange_refresh_token(
        &self,
        tenant: &str,
        request: &RefreshTokenRequest,
    ) -> azure_auth_provider::Result<TokenExchange> {
        self.requests
            .write()
            .await
            .push((tenant.to_string(), request.clone()));

        match self.exchanges.read().await.get(tenant).cloned() {
            Some(ScriptedExchange::Issued(response)) => Ok(TokenExchange::Issued(response)),
            Some(ScriptedExchange::InteractionRequired) => {
                Ok(TokenExchange::InteractionRequired { description: None })
            }
            Some(ScriptedExchange::Error(e)) => Err(e),
            None => Err(ProviderError::InvalidCredentials {
                provider: "aad".to_string(),
                raw_message: Some(format!("no script for tenant {tenant}")),
            }),
        }
    }

    async fn list_tenants(
        &self,
        access_token: &str,
    ) -> azure_auth_provider::Result<Vec<TenantInfo>> {
        self.listing_tokens
            .write()
            .await
            .push(access_token.to_string());
        self.tenants.read().await.clone()
    }

    async fn list_subscriptions(
        &self,
        access_token: &str,
    ) -> azure_auth_provider::Result<Vec<Subscription>> {
        self.subscriptions
            .read()
            .await
            .get(access_token)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ===== MockInteractiveAuth =====

pub struct MockInteractiveAuth {
    /// None: the user cancels the sign-in
    login_response: RwLock<Option<TokenRefreshResponse>>,
    login_error: RwLock<Option<String>>,
    /// None: the user declines consent
    consent_response: RwLock<Option<TokenRefreshResponse>>,
    consent_error: RwLock<Option<String>>,
    consent_prompts: RwLock<Vec<(String, String)>>,
    pending_completion: Mutex<Option<oneshot::Receiver<()>>>,
    cancellations: RwLock<usize>,
}

impl MockInteractiveAuth {
    pub fn new() -> Self {
        Self {
            login_response: RwLock::new(None),
            login_error: RwLock::new(None),
            consent_response: RwLock::new(None),
            consent_error: RwLock::new(None),
            consent_prompts: RwLock::new(Vec::new()),
            pending_completion: Mutex::new(None),
            cancellations: RwLock::new(0),
        }
    }

    pub async fn set_login_response(&self, response: Option<TokenRefreshResponse>) {
        *self.login_response.write().await = response;
    }

    pub async fn set_login_error(&self, err: Option<String>) {
        *self.login_error.write().await = err;
    }

    pub async fn set_consent_response(&self, response: Option<TokenRefreshResponse>) {
        *self.consent_response.write().await = response;
    }

    pub async fn set_consent_error(&self, err: Option<String>) {
        *self.consent_error.write().await = err;
    }

    pub async fn consent_prompts(&self) -> usize {
        self.consent_prompts.read().await.len()
    }

    /// `(resource_endpoint, tenant)` of the latest consent prompt.
    pub async fn last_consent(&self) -> Option<(String, String)> {
        self.consent_prompts.read().await.last().cloned()
    }

    /// Whether the latest granted consent was marked complete.
    pub async fn completion_resolved(&self) -> bool {
        match self.pending_completion.lock().await.take() {
            Some(mut rx) => rx.try_recv().is_ok(),
            None => false,
        }
    }

    pub async fn cancellations(&self) -> usize {
        *self.cancellations.read().await
    }
}

#[async_trait]
impl InteractiveAuth for MockInteractiveAuth {
    fn auth_type(&self) -> AzureAuthType {
        AzureAuthType::AuthCodeGrant
    }

    async fn login(&self) -> CoreResult<InteractiveLogin> {
        if let Some(ref msg) = *self.login_error.read().await {
            return Err(CoreError::ValidationError(msg.clone()));
        }
        Ok(match self.login_response.read().await.clone() {
            Some(response) => InteractiveLogin::Completed(Box::new(response)),
            None => InteractiveLogin::Cancelled,
        })
    }

    async fn prompt_for_consent(
        &self,
        resource_endpoint: &str,
        tenant: &str,
    ) -> CoreResult<ConsentOutcome> {
        self.consent_prompts
            .write()
            .await
            .push((resource_endpoint.to_string(), tenant.to_string()));
        if let Some(ref msg) = *self.consent_error.read().await {
            return Err(CoreError::ValidationError(msg.clone()));
        }

        let Some(response) = self.consent_response.read().await.clone() else {
            return Ok(ConsentOutcome::Declined);
        };
        let (completion, rx) = oneshot::channel();
        *self.pending_completion.lock().await = Some(rx);
        Ok(ConsentOutcome::Granted {
            response: Box::new(response),
            completion,
        })
    }

    async fn auto_oauth_cancelled(&self) {
        *self.cancellations.write().await += 1;
    }
}

// ===== RecordingNotifier =====

pub struct RecordingNotifier {
    errors: RwLock<Vec<String>>,
    infos: RwLock<Vec<String>>,
    consent: RwLock<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            errors: RwLock::new(Vec::new()),
            infos: RwLock::new(Vec::new()),
            consent: RwLock::new(false),
        }
    }

    pub async fn set_consent(&self, consent: bool) {
        *self.consent.write().await = consent;
    }

    pub async fn errors(&self) -> Vec<String> {
        self.errors.read().await.clone()
    }

    pub async fn infos(&self) -> Vec<String> {
        self.infos.read().await.clone()
    }
}

#[async_trait]
impl UserNotifier for RecordingNotifier {
    async fn show_error(&self, message: &str) {
        self.errors.write().await.push(message.to_string());
    }

    async fn show_info(&self, message: &str) {
        self.infos.write().await.push(message.to_string());
    }

    async fn confirm_consent(&self, _tenant: &str, _resource: &str) -> bool {
        *self.consent.read().await
    }
}

// ===== Factories =====

/// Every mock wired into one context, plus a cache over the mock store.
pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub cache: Arc<TokenCache>,
    pub store: Arc<MockCredentialStore>,
    pub provider: Arc<MockIdentityProvider>,
    pub interactive: Arc<MockInteractiveAuth>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MockCredentialStore::new());
        let provider = Arc::new(MockIdentityProvider::new());
        let interactive = Arc::new(MockInteractiveAuth::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let ctx = Arc::new(ServiceContext::new(
            store.clone(),
            provider.clone(),
            interactive.clone(),
            notifier.clone(),
        ));
        let cache = Arc::new(TokenCache::new(store.clone()));

        Self {
            ctx,
            cache,
            store,
            provider,
            interactive,
            notifier,
        }
    }

    /// Lifecycle service sharing this harness's cache.
    pub fn lifecycle(&self) -> AccountLifecycleService {
        AccountLifecycleService::with_cache(self.ctx.clone(), self.cache.clone())
    }

    /// Store an account's base (tenant-less) token pair.
    pub async fn seed_base_tokens(&self, account_id: &str, refresh: &str) {
        self.cache
            .save(
                account_id,
                &access_token(account_id, "base-access"),
                &refresh_token(account_id, refresh),
                None,
                None,
            )
            .await
            .unwrap();
    }
}
