//! Identity provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod azure;

pub use azure::AzureIdentityProvider;
