//! Azure error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

/// Errors returned by the login endpoint (`/oauth2/token`).
pub(crate) struct AadErrors;

/// Errors returned by Azure Resource Manager.
pub(crate) struct ArmErrors;

/// OAuth2 error codes of the v1 token endpoint
/// Reference: <https://learn.microsoft.com/entra/identity-platform/reference-error-codes>
impl ProviderErrorMapper for AadErrors {
    fn provider_name(&self) -> &'static str {
        "aad"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        if let Some(e) = self.transient_error(&raw) {
            return e;
        }

        match raw.code.as_deref() {
            // Revoked, expired or foreign refresh token; bad client registration
            Some("invalid_grant" | "invalid_client" | "unauthorized_client") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // AADSTS90002: tenant not found
            Some("invalid_request") if raw.message.contains("AADSTS90002") => {
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: "tenant".to_string(),
                    detail: format!(
                        "{}: {}",
                        context.tenant.unwrap_or_else(|| "<unknown>".to_string()),
                        raw.message
                    ),
                }
            }

            Some("invalid_resource" | "invalid_scope") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "resource".to_string(),
                detail: format!(
                    "{}: {}",
                    context.resource.unwrap_or_else(|| "<none>".to_string()),
                    raw.message
                ),
            },

            Some("invalid_request") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "request".to_string(),
                detail: raw.message,
            },

            // Endpoint-side outage
            Some("temporarily_unavailable") => ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: raw.message,
            },

            _ if raw.status == 401 => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}

/// ARM error codes
/// Reference: <https://learn.microsoft.com/azure/azure-resource-manager/troubleshooting/common-deployment-errors>
impl ProviderErrorMapper for ArmErrors {
    fn provider_name(&self) -> &'static str {
        "arm"
    }

    fn map_error(&self, raw: RawApiError, _context: ErrorContext) -> ProviderError {
        if let Some(e) = self.transient_error(&raw) {
            return e;
        }

        match raw.code.as_deref() {
            Some(
                "InvalidAuthenticationToken"
                | "InvalidAuthenticationTokenTenant"
                | "ExpiredAuthenticationToken"
                | "AuthenticationFailed",
            ) => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("AuthorizationFailed") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("InvalidApiVersionParameter" | "MissingApiVersionParameter") => {
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: "api-version".to_string(),
                    detail: raw.message,
                }
            }

            _ if raw.status == 401 => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ if raw.status == 403 => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}
