//! Azure identity platform and Resource Manager client

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::create_http_client;
use crate::types::ProviderSettings;

pub(crate) use error::{AadErrors, ArmErrors};

/// Azure identity provider backed by the v1 token endpoint and ARM.
pub struct AzureIdentityProvider {
    pub(crate) client: Client,
    pub(crate) settings: ProviderSettings,
}

impl AzureIdentityProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self::with_client(settings, create_http_client())
    }

    /// Use a caller-supplied HTTP client (proxy, custom TLS roots).
    pub fn with_client(settings: ProviderSettings, client: Client) -> Self {
        Self { client, settings }
    }
}
