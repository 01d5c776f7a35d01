//! Business logic service layer

mod account_lifecycle;
mod expiry;
mod refresh_engine;
mod tenant_resolver;
mod token_cache;

pub use account_lifecycle::{AccountLifecycleService, LoginOutcome};
pub use expiry::ExpiryIndex;
pub use refresh_engine::TokenRefreshEngine;
pub use tenant_resolver::{TenantResolver, move_home_tenant_first};
pub use token_cache::TokenCache;

use std::sync::Arc;

use azure_auth_provider::{IdentityProvider, ProviderSettings};

use crate::traits::{CredentialStore, InteractiveAuth, UserNotifier};

/// Service context - holds every collaborator
///
/// The host creates this context and injects its platform-specific
/// implementations.
pub struct ServiceContext {
    /// Credential storage
    pub credential_store: Arc<dyn CredentialStore>,
    /// Token endpoint and management API client
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Interactive sign-in and consent flow
    pub interactive_auth: Arc<dyn InteractiveAuth>,
    /// User-visible messages
    pub notifier: Arc<dyn UserNotifier>,
}

impl ServiceContext {
    /// Create a service context
    #[must_use]
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        interactive_auth: Arc<dyn InteractiveAuth>,
        notifier: Arc<dyn UserNotifier>,
    ) -> Self {
        Self {
            credential_store,
            identity_provider,
            interactive_auth,
            notifier,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        self.identity_provider.settings()
    }
}
