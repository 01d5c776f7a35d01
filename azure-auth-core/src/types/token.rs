//! Token types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use azure_auth_provider::{Tenant, TokenClaims, TokenEndpointResponse, decode_token_claims};

use crate::error::{CoreError, CoreResult};
use crate::utils::time::parse_expires_on;

/// Bearer scheme attached to every issued token.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Access token plus the claims-derived key it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub key: String,
    pub token: String,
}

/// One refresh token per account, reused across tenants and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub key: String,
    pub token: String,
}

/// Access/refresh pair read back from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Result of a successful token exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRefreshResponse {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub token_claims: TokenClaims,
    /// Epoch seconds.
    pub expires_on: Option<i64>,
}

impl TokenRefreshResponse {
    /// Decode the issued access token and key both tokens by its claims.
    ///
    /// The key is empty when the claims carry no email, unique name or name.
    /// Without a readable `expires_on` the access token's own `exp` is used.
    pub fn from_endpoint(response: TokenEndpointResponse) -> CoreResult<Self> {
        let token_claims = decode_token_claims(&response.access_token)?;
        let key = token_claims.account_key().unwrap_or_default().to_string();
        let expires_on = parse_expires_on(&response.expires_on)
            .or_else(|| token_claims.expires_at().map(|at| at.timestamp()));

        Ok(Self {
            access_token: AccessToken {
                key: key.clone(),
                token: response.access_token,
            },
            refresh_token: RefreshToken {
                key,
                token: response.refresh_token,
            },
            token_claims,
            expires_on,
        })
    }
}

/// Bearer token returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub key: String,
    pub token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: &AccessToken) -> Self {
        Self {
            key: access_token.key.clone(),
            token: access_token.token.clone(),
            token_type: BEARER_TOKEN_TYPE.to_string(),
        }
    }
}

/// Tenant or subscription id to bearer token.
pub type TokenResponse = HashMap<String, Token>;

/// Outcome of a single refresh attempt.
#[derive(Debug)]
pub enum RefreshOutcome {
    Refreshed(Box<TokenRefreshResponse>),
    /// Consent was required and the user did not give it.
    Declined,
    Failed(CoreError),
}

impl RefreshOutcome {
    #[must_use]
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed(_))
    }
}

/// What happened to one tenant while gathering security tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum TenantTokenOutcome {
    /// A fresh token was already cached.
    Cached,
    Refreshed,
    /// Dropped from the account's tenant list.
    Dropped(String),
}

/// Tokens gathered for every tenant of an account.
#[derive(Debug, Clone, Default)]
pub struct SecurityTokens {
    pub tokens: TokenResponse,
    pub tenant_outcomes: Vec<(Tenant, TenantTokenOutcome)>,
}

impl SecurityTokens {
    /// Tenants that ended without a token.
    pub fn dropped_tenants(&self) -> impl Iterator<Item = &Tenant> {
        self.tenant_outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TenantTokenOutcome::Dropped(_)))
            .map(|(tenant, _)| tenant)
    }

    pub fn get(&self, id: &str) -> Option<&Token> {
        self.tokens.get(id)
    }
}
