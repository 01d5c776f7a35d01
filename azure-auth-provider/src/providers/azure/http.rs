//! Azure HTTP request methods

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::providers::common::{resolve_endpoint, tenant_token_url};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::{RefreshTokenRequest, TokenEndpointResponse, TokenExchange};
use crate::utils::log_sanitizer::sanitize_body;

use super::types::{AadErrorResponse, ArmErrorEnvelope};
use super::{AadErrors, ArmErrors, AzureIdentityProvider};

const INTERACTION_REQUIRED: &str = "interaction_required";

impl AzureIdentityProvider {
    /// POST a refresh-token grant to the tenant's token endpoint.
    pub(crate) async fn post_token(
        &self,
        tenant: &str,
        request: &RefreshTokenRequest,
    ) -> Result<TokenExchange> {
        let url = tenant_token_url(&self.settings.host, tenant);

        let builder = self
            .client
            .post(&url)
            .form(&request.form_pairs());

        let reply = HttpUtils::send(builder, AadErrors.provider_name(), "POST", &url).await?;
        if reply.is_success() {
            let response: TokenEndpointResponse =
                HttpUtils::parse_json(&reply.body, AadErrors.provider_name())?;
            return Ok(TokenExchange::Issued(response));
        }

        let ctx = ErrorContext {
            tenant: Some(tenant.to_string()),
            resource: request.resource.clone(),
        };

        let raw = match serde_json::from_str::<AadErrorResponse>(&reply.body) {
            Ok(error) if error.error == INTERACTION_REQUIRED => {
                log::info!("[aad] Tenant {tenant} requires interaction");
                return Ok(TokenExchange::InteractionRequired {
                    description: error.error_description,
                });
            }
            Ok(error) => {
                log::warn!(
                    "[aad] Token request failed: {} {:?}",
                    error.error,
                    error.error_codes
                );
                RawApiError::with_code(
                    reply.status,
                    error.error,
                    error.error_description.unwrap_or_default(),
                )
            }
            Err(_) => RawApiError::new(reply.status, format!("HTTP {}: {}", reply.status, sanitize_body(&reply.body))),
        };
        Err(AadErrors.map_error(raw.retry_after(reply.retry_after), ctx))
    }

    /// GET a Resource Manager path with a bearer token.
    pub(crate) async fn get_arm<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T> {
        let url = resolve_endpoint(
            &self.settings.arm_resource.endpoint,
            path,
            ArmErrors.provider_name(),
        )?;

        let builder = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json");

        let reply = HttpUtils::send(builder, ArmErrors.provider_name(), "GET", &url).await?;
        if reply.is_success() {
            return HttpUtils::parse_json(&reply.body, ArmErrors.provider_name());
        }

        let raw = match serde_json::from_str::<ArmErrorEnvelope>(&reply.body) {
            Ok(envelope) => {
                RawApiError::with_code(reply.status, envelope.error.code, envelope.error.message)
            }
            Err(_) => RawApiError::new(reply.status, format!("HTTP {}: {}", reply.status, sanitize_body(&reply.body))),
        };
        log::error!("[arm] API error: {}", raw.message);
        Err(ArmErrors.map_error(raw.retry_after(reply.retry_after), ErrorContext::default()))
    }
}
