//! Provider shared helpers

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{ProviderError, Result};
use crate::types::COMMON_TENANT;

// ============ HTTP Client ============

/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Create an HTTP client with timeouts configured
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to build HTTP client with timeouts, using defaults: {e}");
            Client::new()
        })
}

// ============ Endpoints ============

/// Token endpoint of a tenant: `{host}{tenant}/oauth2/token`.
///
/// `host` is used verbatim (it carries its own trailing slash); an empty
/// tenant falls back to `common`.
pub fn tenant_token_url(host: &str, tenant: &str) -> String {
    let tenant = if tenant.is_empty() {
        COMMON_TENANT
    } else {
        tenant
    };
    format!("{host}{}/oauth2/token", urlencoding::encode(tenant))
}

/// Resolve `relative` against `base` with URL reference semantics.
///
/// `https://management.azure.com/` + `tenants?api-version=x`
/// -> `https://management.azure.com/tenants?api-version=x`
pub fn resolve_endpoint(base: &str, relative: &str, provider: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|e| ProviderError::InvalidParameter {
        provider: provider.to_string(),
        param: "endpoint".to_string(),
        detail: format!("{base}: {e}"),
    })?;
    base.join(relative)
        .map(String::from)
        .map_err(|e| ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "endpoint".to_string(),
            detail: format!("{relative}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_for_tenant() {
        assert_eq!(
            tenant_token_url("https://login.microsoftonline.com/", "t1"),
            "https://login.microsoftonline.com/t1/oauth2/token"
        );
    }

    #[test]
    fn token_url_defaults_to_common() {
        assert_eq!(
            tenant_token_url("https://login.microsoftonline.com/", ""),
            "https://login.microsoftonline.com/common/oauth2/token"
        );
    }

    #[test]
    fn resolve_with_trailing_slash() {
        assert_eq!(
            resolve_endpoint("https://management.azure.com/", "tenants?api-version=2019-11-01", "arm")
                .unwrap(),
            "https://management.azure.com/tenants?api-version=2019-11-01"
        );
    }

    #[test]
    fn resolve_replaces_last_segment_without_slash() {
        assert_eq!(
            resolve_endpoint("https://host/base/arm", "subscriptions", "arm").unwrap(),
            "https://host/base/subscriptions"
        );
    }

    #[test]
    fn resolve_rejects_bad_base() {
        let err = resolve_endpoint("not a url", "tenants", "arm").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { ref param, .. } if param == "endpoint"
        ));
    }
}
