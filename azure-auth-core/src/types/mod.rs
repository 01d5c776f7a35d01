//! Type definitions

mod account;
mod token;

pub use account::{
    AccountDisplayInfo, AccountIssuer, AccountKey, AccountType, AzureAccount,
    AzureAccountProperties, AzureAuthType, MICROSOFT_ACCOUNT_IDP, MICROSOFT_CORP_ISSUER,
};
pub use token::{
    AccessToken, BEARER_TOKEN_TYPE, CachedTokens, RefreshOutcome, RefreshToken, SecurityTokens,
    TenantTokenOutcome, Token, TokenRefreshResponse, TokenResponse,
};

// Re-export provider types used across the core API
pub use azure_auth_provider::{
    AzureCloud, AzureResource, ProviderSettings, Resource, Subscription, Tenant, TenantInfo,
    TokenClaims,
};
