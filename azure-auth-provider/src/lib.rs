//! # azure-auth-provider
//!
//! HTTP-facing client for the Azure identity platform (v1 token endpoint) and
//! the Azure Resource Manager listings needed to discover an account's
//! tenants and subscriptions.
//!
//! ## Endpoints
//!
//! | Operation | Request | Auth |
//! |-----------|---------|------|
//! | Refresh-token exchange | `POST {host}{tenant}/oauth2/token` | form body |
//! | List tenants | `GET {arm}/tenants?api-version=2019-11-01` | Bearer |
//! | List subscriptions | `GET {arm}/subscriptions?api-version=2019-11-01` | Bearer |
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use azure_auth_provider::{
//!     create_identity_provider, AzureCloud, RefreshTokenRequest, TokenExchange, COMMON_TENANT,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = AzureCloud::Public.settings();
//!     let provider = create_identity_provider(settings.clone());
//!
//!     let request = RefreshTokenRequest {
//!         refresh_token: "0.AAAA...".to_string(),
//!         client_id: settings.client_id.clone(),
//!         resource: Some(settings.arm_resource.endpoint.clone()),
//!     };
//!
//!     match provider.exchange_refresh_token(COMMON_TENANT, &request).await? {
//!         TokenExchange::Issued(tokens) => {
//!             for tenant in provider.list_tenants(&tokens.access_token).await? {
//!                 println!("{} {:?}", tenant.tenant_id, tenant.display_name);
//!             }
//!         }
//!         TokenExchange::InteractionRequired { description } => {
//!             println!("consent needed: {description:?}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Claims
//!
//! [`decode_token_claims`] reads the payload of a JWT without verifying its
//! signature:
//!
//! ```rust
//! # use azure_auth_provider::decode_token_claims;
//! assert!(decode_token_claims("not-a-jwt").is_err());
//! ```
//!
//! ## Error Handling
//!
//! All network operations return [`Result<T, ProviderError>`](ProviderError).
//! `interaction_required` is not an error; it is reported as
//! [`TokenExchange::InteractionRequired`]. Nothing is retried.

mod claims;
mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export claims decoding
pub use claims::{ClaimsDecodeError, TokenClaims, decode_token_claims};

// Re-export factory function
pub use factory::create_identity_provider;

// Re-export core trait only (internal traits are not exported)
pub use traits::IdentityProvider;

// Re-export types
pub use types::{
    ARM_API_VERSION, AzureCloud, AzureResource, COMMON_TENANT, HOME_TENANT_CATEGORY,
    ProviderSettings, RefreshTokenRequest, Resource, Subscription, Tenant, TenantInfo,
    TokenEndpointResponse, TokenExchange,
};

// Re-export utils module
pub use utils::log_sanitizer;

// Re-export concrete provider
pub use providers::AzureIdentityProvider;
