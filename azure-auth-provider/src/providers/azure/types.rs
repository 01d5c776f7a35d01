//! Azure wire types

use serde::Deserialize;

/// Listing envelope used by ARM collection endpoints.
#[derive(Debug, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Subscription item of `GET /subscriptions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmSubscription {
    pub subscription_id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub display_name: String,
}

/// OAuth2 error body of the token endpoint.
#[derive(Debug, Deserialize)]
pub struct AadErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_codes: Option<Vec<i64>>,
}

/// ARM error envelope: `{"error":{"code":"...","message":"..."}}`.
#[derive(Debug, Deserialize)]
pub struct ArmErrorEnvelope {
    pub error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ArmErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
