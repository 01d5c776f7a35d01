use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{ProviderSettings, RefreshTokenRequest, Subscription, TenantInfo, TokenExchange};

/// Raw API error (internal)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (`invalid_grant`, `AuthorizationFailed`, ...)
    pub code: Option<String>,
    /// Raw error message
    pub message: String,
    /// HTTP status of the failed response
    pub status: u16,
    /// `Retry-After` seconds sent with the response
    pub retry_after: Option<u64>,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            status,
            retry_after: None,
        }
    }

    pub fn with_code(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            status,
            retry_after: None,
        }
    }

    #[must_use]
    pub fn retry_after(mut self, seconds: Option<u64>) -> Self {
        self.retry_after = seconds;
        self
    }
}

/// Extra information available when mapping an error (internal)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Tenant the request was addressed to
    pub tenant: Option<String>,
    /// Audience requested from the token endpoint
    pub resource: Option<String>,
}

/// Maps raw API errors onto [`ProviderError`] (internal)
pub(crate) trait ProviderErrorMapper {
    /// Endpoint family identifier
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Throttling and gateway statuses, whatever the body says.
    ///
    /// HTTP 429 becomes `RateLimited` carrying `Retry-After`; 502, 503 and
    /// 504 become `NetworkError`.
    fn transient_error(&self, raw: &RawApiError) -> Option<ProviderError> {
        match raw.status {
            429 => Some(ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: raw.retry_after,
                raw_message: Some(raw.message.clone()),
            }),
            502..=504 => Some(ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: raw.message.clone(),
            }),
            _ => None,
        }
    }

    /// Shortcut: unknown error (fallback)
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Identity platform client: token endpoint plus the management listings
/// needed to discover an account's tenants and subscriptions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Settings this client was built from.
    fn settings(&self) -> &ProviderSettings;

    /// Exchange a refresh token at `{host}{tenant}/oauth2/token`.
    ///
    /// # Arguments
    /// * `tenant` - tenant id, or [`COMMON_TENANT`](crate::COMMON_TENANT)
    /// * `request` - refresh token, client id and optional audience
    ///
    /// # Returns
    /// * `Ok(TokenExchange::Issued)` - new token pair
    /// * `Ok(TokenExchange::InteractionRequired)` - the tenant wants the user to re-consent
    /// * `Err(ProviderError)` - any other failure
    async fn exchange_refresh_token(
        &self,
        tenant: &str,
        request: &RefreshTokenRequest,
    ) -> Result<TokenExchange>;

    /// List the tenants visible to a management API bearer token.
    async fn list_tenants(&self, access_token: &str) -> Result<Vec<TenantInfo>>;

    /// List the subscriptions visible to a management API bearer token.
    async fn list_subscriptions(&self, access_token: &str) -> Result<Vec<Subscription>>;
}
