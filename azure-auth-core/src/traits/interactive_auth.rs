//! Interactive sign-in abstract Trait

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::CoreResult;
use crate::types::{AzureAuthType, TokenRefreshResponse};

/// Result of an interactive sign-in.
#[derive(Debug)]
pub enum InteractiveLogin {
    Completed(Box<TokenRefreshResponse>),
    /// The user closed the flow before it finished.
    Cancelled,
}

/// Result of a consent round-trip for one tenant and resource.
#[derive(Debug)]
pub enum ConsentOutcome {
    /// Consent was given. `completion` is resolved once the tokens are taken over.
    Granted {
        response: Box<TokenRefreshResponse>,
        completion: oneshot::Sender<()>,
    },
    Declined,
}

/// Browser or device-code flow driven by the host application.
///
/// The implementation is selected by [`AzureAuthType`].
#[async_trait]
pub trait InteractiveAuth: Send + Sync {
    /// Flow implemented by this collaborator.
    fn auth_type(&self) -> AzureAuthType;

    /// Run the full sign-in flow.
    async fn login(&self) -> CoreResult<InteractiveLogin>;

    /// Ask the user to re-authorize access to a resource in one tenant.
    ///
    /// # Arguments
    /// * `resource_endpoint` - Audience the token must be scoped to
    /// * `tenant` - Tenant id requiring consent
    async fn prompt_for_consent(
        &self,
        resource_endpoint: &str,
        tenant: &str,
    ) -> CoreResult<ConsentOutcome>;

    /// Called when a sign-in was cancelled so the flow can release its resources.
    async fn auto_oauth_cancelled(&self);
}
