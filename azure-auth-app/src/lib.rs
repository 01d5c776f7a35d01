//! Platform-agnostic application bootstrap for Azure account sign-in.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter
//! injection) and `AuthConfig` (cloud and flow selection).

pub mod adapters;
pub mod config;

use std::sync::Arc;

use azure_auth_core::error::{CoreError, CoreResult};
use azure_auth_core::services::{AccountLifecycleService, ServiceContext};
use azure_auth_core::traits::{
    CredentialStore, InMemoryCredentialStore, InteractiveAuth, LogNotifier, UserNotifier,
};
use azure_auth_core::types::ProviderSettings;
use azure_auth_provider::{IdentityProvider, create_identity_provider};

pub use config::AuthConfig;

/// Platform-agnostic application state.
///
/// Every frontend constructs this once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all collaborators)
    pub ctx: Arc<ServiceContext>,
    /// Account lifecycle service
    pub lifecycle: Arc<AccountLifecycleService>,
    /// Configuration the state was built from
    pub config: AuthConfig,
}

impl AppState {
    /// Settings of the cloud this state signs in to.
    pub fn settings(&self) -> &ProviderSettings {
        self.ctx.settings()
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `interactive_auth`: the sign-in and consent flow
///
/// # Optional
/// - `config`: defaults to the public cloud with the auth-code flow
/// - `credential_store`: defaults to `InMemoryCredentialStore`
/// - `identity_provider`: defaults to the HTTP client for the configured settings
/// - `notifier`: defaults to `LogNotifier`
pub struct AppStateBuilder {
    config: AuthConfig,
    credential_store: Option<Arc<dyn CredentialStore>>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    interactive_auth: Option<Arc<dyn InteractiveAuth>>,
    notifier: Option<Arc<dyn UserNotifier>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AuthConfig::default(),
            credential_store: None,
            identity_provider: None,
            interactive_auth: None,
            notifier: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    #[must_use]
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn interactive_auth(mut self, auth: Arc<dyn InteractiveAuth>) -> Self {
        self.interactive_auth = Some(auth);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn UserNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if `interactive_auth` is missing or
    /// implements a different flow than the configured `authType`.
    pub fn build(self) -> CoreResult<AppState> {
        let interactive_auth = self.interactive_auth.ok_or_else(|| {
            CoreError::ValidationError("interactive_auth is required".to_string())
        })?;
        if interactive_auth.auth_type() != self.config.auth_type {
            return Err(CoreError::ValidationError(format!(
                "interactive_auth implements {:?} but {:?} is configured",
                interactive_auth.auth_type(),
                self.config.auth_type
            )));
        }

        let credential_store = self
            .credential_store
            .unwrap_or_else(|| Arc::new(InMemoryCredentialStore::new()));
        let identity_provider = self
            .identity_provider
            .unwrap_or_else(|| create_identity_provider(self.config.provider_settings()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        log::info!(
            "Building app state for {} ({:?})",
            identity_provider.settings().display_name,
            self.config.auth_type
        );

        let ctx = Arc::new(ServiceContext::new(
            credential_store,
            identity_provider,
            interactive_auth,
            notifier,
        ));
        let lifecycle = Arc::new(AccountLifecycleService::new(Arc::clone(&ctx)));

        Ok(AppState {
            ctx,
            lifecycle,
            config: self.config,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
