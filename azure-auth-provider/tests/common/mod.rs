//! Shared test helpers

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use httpmock::MockServer;

use azure_auth_provider::{AzureCloud, ProviderSettings};

/// Assert an `Option` is `Some` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Public-cloud settings with the login host and ARM endpoint pointed at a mock server.
///
/// Token endpoint: `{base}/{tenant}/oauth2/token`; ARM: `{base}/arm/...`.
pub fn mock_settings(server: &MockServer) -> ProviderSettings {
    let mut settings = AzureCloud::Public.settings();
    settings.host = format!("{}/", server.base_url());
    settings.arm_resource.endpoint = format!("{}/arm/", server.base_url());
    settings.client_id = "test-client".to_string();
    settings
}

/// Unsigned JWT carrying the given JSON payload.
pub fn make_jwt(payload: &serde_json::Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes())
    )
}
