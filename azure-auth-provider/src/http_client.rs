//! Request sending shared by the token endpoint and the management API
//!
//! Only transport failures become errors here. Every HTTP status, including
//! throttling and gateway failures, comes back as an [`HttpReply`] and is
//! classified by the endpoint's error mapper.

use reqwest::RequestBuilder;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::sanitize_body;

/// Status, body and throttling hint of a completed request.
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: u16,
    pub body: String,
    /// `Retry-After` in seconds, when sent as a number.
    pub retry_after: Option<u64>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Send `request` and read the whole reply.
    ///
    /// `endpoint` tags logs and transport errors (`aad`, `arm`).
    pub async fn send(
        request: RequestBuilder,
        endpoint: &str,
        method: &str,
        url: &str,
    ) -> Result<HttpReply, ProviderError> {
        log::debug!("[{endpoint}] {method} {url}");

        let response = request.send().await.map_err(|e| {
            let detail = e.to_string();
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: endpoint.to_string(),
                    detail,
                }
            } else {
                ProviderError::NetworkError {
                    provider: endpoint.to_string(),
                    detail,
                }
            }
        })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        let body = response.text().await.map_err(|e| ProviderError::NetworkError {
            provider: endpoint.to_string(),
            detail: format!("Reading the HTTP {status} reply failed: {e}"),
        })?;
        log::debug!("[{endpoint}] HTTP {status}: {}", sanitize_body(&body));

        Ok(HttpReply {
            status,
            body,
            retry_after,
        })
    }

    /// Deserialize a success body; the raw body is only logged sanitized.
    pub fn parse_json<T: DeserializeOwned>(body: &str, endpoint: &str) -> Result<T, ProviderError> {
        serde_json::from_str(body).map_err(|e| {
            log::error!(
                "[{endpoint}] Unexpected reply shape ({e}): {}",
                sanitize_body(body)
            );
            ProviderError::ParseError {
                provider: endpoint.to_string(),
                detail: e.to_string(),
            }
        })
    }
}
