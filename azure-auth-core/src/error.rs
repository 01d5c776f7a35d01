//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error types
pub use azure_auth_provider::{ClaimsDecodeError, ProviderError};

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Access token could not be decoded as a JWT
    #[error("Unable to read token claims: {0}")]
    ClaimsDecode(String),

    /// Token pair rejected before it reached the cache
    #[error("{0}")]
    InvalidToken(String),

    /// Token endpoint exchange failed
    #[error("{0}")]
    TokenRefresh(String),

    /// Tenant listing failed
    #[error("Error retrieving tenant information: {0}")]
    TenantList(String),

    /// Subscription listing failed
    #[error("Error retrieving subscription information: {0}")]
    SubscriptionList(String),

    /// Credential storage error
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl From<ClaimsDecodeError> for CoreError {
    fn from(e: ClaimsDecodeError) -> Self {
        Self::ClaimsDecode(e.to_string())
    }
}

impl CoreError {
    /// Whether it is expected behavior (user input, revoked grant, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidToken(_) | Self::ValidationError(_) => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
