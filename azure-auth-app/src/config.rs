//! Host configuration loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use azure_auth_core::error::{CoreError, CoreResult};
use azure_auth_core::types::{AzureAuthType, AzureCloud, ProviderSettings};

/// Which cloud to sign in to and which interactive flow to use.
///
/// ```json
/// { "cloud": "china", "authType": "deviceCode" }
/// ```
///
/// Explicit `settings` replace the cloud preset entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    pub cloud: AzureCloud,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProviderSettings>,
    pub auth_type: AzureAuthType,
}

impl AuthConfig {
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::SerializationError(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ValidationError(format!("Cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded auth config from {} (cloud: {:?}, flow: {:?})",
            path.display(),
            config.cloud,
            config.auth_type
        );
        Ok(config)
    }

    /// Settings used to build the identity provider.
    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        self.settings
            .clone()
            .unwrap_or_else(|| self.cloud.settings())
    }
}
