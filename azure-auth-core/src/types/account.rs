//! Account types

use serde::{Deserialize, Serialize};

use azure_auth_provider::{ProviderSettings, Subscription, Tenant, TokenClaims};

use crate::messages;

/// Issuer of the account's first access token, as used by identity display.
pub const MICROSOFT_CORP_ISSUER: &str =
    "https://sts.windows.net/72f988bf-86f1-41af-91ab-2d7cd011db47/";

/// Identity provider claim carried by personal Microsoft accounts.
pub const MICROSOFT_ACCOUNT_IDP: &str = "live.com";

/// Uniquely identifies an account across providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountKey {
    pub provider_id: String,
    /// Addresses every cache entry of the account.
    pub account_id: String,
}

/// Which interactive flow signs the account in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AzureAuthType {
    #[default]
    AuthCodeGrant,
    DeviceCode,
}

/// Account category shown next to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "work_school")]
    WorkSchool,
    #[serde(rename = "microsoft")]
    Microsoft,
}

/// Who issued the identity, derived from claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountIssuer {
    /// Microsoft's own corporate tenant.
    Corp,
    /// Personal Microsoft account.
    Msft,
    Unknown,
}

impl AccountIssuer {
    /// Exact-match classification; `idp` wins over `iss`.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        if claims.idp.as_deref() == Some(MICROSOFT_ACCOUNT_IDP) {
            Self::Msft
        } else if claims.iss.as_deref() == Some(MICROSOFT_CORP_ISSUER) {
            Self::Corp
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDisplayInfo {
    pub account_type: AccountType,
    pub user_id: String,
    pub contextual_display_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureAccountProperties {
    pub provider_settings: ProviderSettings,
    pub is_ms_account: bool,
    /// Home tenant first.
    pub tenants: Vec<Tenant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<Subscription>>,
    pub azure_auth_type: AzureAuthType,
}

/// A signed-in identity plus its known tenants and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureAccount {
    pub key: AccountKey,
    pub name: String,
    pub display_info: AccountDisplayInfo,
    pub properties: AzureAccountProperties,
    /// Set when the account's tokens can no longer be refreshed silently.
    pub is_stale: bool,
}

impl AzureAccount {
    /// Build a normalized account record from token claims.
    ///
    /// `key` is the access token's key and becomes both the account id and
    /// the user id.
    pub fn from_claims(
        claims: &TokenClaims,
        key: &str,
        tenants: Vec<Tenant>,
        settings: &ProviderSettings,
        auth_type: AzureAuthType,
    ) -> Self {
        let issuer = AccountIssuer::from_claims(claims);
        let display_name = claims.display_name().unwrap_or_default().to_string();

        let contextual_display_name = match issuer {
            AccountIssuer::Corp => messages::MICROSOFT_CORP_ACCOUNT.to_string(),
            AccountIssuer::Msft => messages::MICROSOFT_ACCOUNT.to_string(),
            AccountIssuer::Unknown => display_name.clone(),
        };

        let account_type = if issuer == AccountIssuer::Msft {
            AccountType::Microsoft
        } else {
            AccountType::WorkSchool
        };

        Self {
            key: AccountKey {
                provider_id: settings.id.clone(),
                account_id: key.to_string(),
            },
            name: key.to_string(),
            display_info: AccountDisplayInfo {
                account_type,
                user_id: key.to_string(),
                contextual_display_name,
                display_name,
            },
            properties: AzureAccountProperties {
                provider_settings: settings.clone(),
                is_ms_account: issuer == AccountIssuer::Msft,
                tenants,
                subscriptions: None,
                azure_auth_type: auth_type,
            },
            is_stale: false,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.key.account_id
    }
}
