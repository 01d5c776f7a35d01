//! Provider factory functions.

use std::sync::Arc;

use crate::providers::AzureIdentityProvider;
use crate::traits::IdentityProvider;
use crate::types::ProviderSettings;

/// Creates an [`IdentityProvider`] for the given settings.
///
/// The returned provider is wrapped in `Arc<dyn IdentityProvider>` for easy
/// sharing across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use azure_auth_provider::{AzureCloud, create_identity_provider};
///
/// let provider = create_identity_provider(AzureCloud::Public.settings());
/// assert_eq!(provider.settings().host, "https://login.microsoftonline.com/");
/// ```
pub fn create_identity_provider(settings: ProviderSettings) -> Arc<dyn IdentityProvider> {
    Arc::new(AzureIdentityProvider::new(settings))
}
