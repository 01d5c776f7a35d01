//! JWT claims decoding.
//!
//! Tokens issued by the identity platform are `header.payload.signature`;
//! only the payload is read. The signature is **not** verified: the token
//! came straight from the token endpoint over TLS and is only inspected for
//! identity and expiry hints.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded JWT payload. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
}

/// Why a token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsDecodeError {
    #[error("token is not a JWT: expected header.payload.signature")]
    MissingSegment,

    #[error("token payload is not valid base64url: {0}")]
    InvalidBase64(String),

    #[error("token payload is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Decode the payload segment of a JWT.
pub fn decode_token_claims(token: &str) -> Result<TokenClaims, ClaimsDecodeError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(ClaimsDecodeError::MissingSegment),
    };

    // Some issuers emit the standard alphabet or keep padding
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| ClaimsDecodeError::InvalidBase64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClaimsDecodeError::InvalidJson(e.to_string()))
}

fn first_non_empty<'a>(candidates: &[Option<&'a String>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.as_str())
        .find(|s| !s.is_empty())
}

impl TokenClaims {
    /// Key under which the token pair is labelled: email, unique name, then name.
    pub fn account_key(&self) -> Option<&str> {
        first_non_empty(&[
            self.email.as_ref(),
            self.unique_name.as_ref(),
            self.name.as_ref(),
        ])
    }

    /// Human readable name: name, email, then unique name.
    pub fn display_name(&self) -> Option<&str> {
        first_non_empty(&[
            self.name.as_ref(),
            self.email.as_ref(),
            self.unique_name.as_ref(),
        ])
    }

    /// `exp` as a timestamp, if present and representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};

    fn jwt_with(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload.as_bytes())
        )
    }

    #[test]
    fn decodes_payload_fields() {
        let token = jwt_with(
            r#"{"iss":"https://sts.windows.net/t/","tid":"t","email":"a@contoso.com","exp":1700000000,"roles":["r1"]}"#,
        );
        let claims = decode_token_claims(&token).unwrap();
        assert_eq!(claims.iss.as_deref(), Some("https://sts.windows.net/t/"));
        assert_eq!(claims.tid.as_deref(), Some("t"));
        assert_eq!(claims.email.as_deref(), Some("a@contoso.com"));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.roles, Some(vec!["r1".to_string()]));
        assert!(claims.name.is_none());
    }

    #[test]
    fn ignores_unknown_fields() {
        let token = jwt_with(r#"{"name":"Ann","amr":["pwd"],"wids":["x"]}"#);
        let claims = decode_token_claims(&token).unwrap();
        assert_eq!(claims.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn accepts_padded_and_standard_alphabet() {
        let payload = br#"{"name":"J?rg>>"}"#;
        let padded = format!("h.{}.s", URL_SAFE.encode(payload));
        let standard = format!("h.{}.s", STANDARD.encode(payload));
        assert_eq!(
            decode_token_claims(&padded).unwrap().name.as_deref(),
            Some("J?rg>>")
        );
        assert_eq!(
            decode_token_claims(&standard).unwrap().name.as_deref(),
            Some("J?rg>>")
        );
    }

    #[test]
    fn rejects_token_without_payload() {
        assert_eq!(
            decode_token_claims("opaque-token"),
            Err(ClaimsDecodeError::MissingSegment)
        );
        assert_eq!(
            decode_token_claims("header..sig"),
            Err(ClaimsDecodeError::MissingSegment)
        );
    }

    #[test]
    fn rejects_bad_base64() {
        let result = decode_token_claims("h.@@@.s");
        assert!(matches!(result, Err(ClaimsDecodeError::InvalidBase64(_))));
    }

    #[test]
    fn rejects_non_json_payload() {
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"not json"));
        let result = decode_token_claims(&token);
        assert!(matches!(result, Err(ClaimsDecodeError::InvalidJson(_))));
    }

    #[test]
    fn account_key_prefers_email() {
        let claims = TokenClaims {
            email: Some(String::new()),
            unique_name: Some("live.com#a@outlook.com".into()),
            name: Some("Ann".into()),
            ..Default::default()
        };
        assert_eq!(claims.account_key(), Some("live.com#a@outlook.com"));
    }

    #[test]
    fn display_name_prefers_name() {
        let claims = TokenClaims {
            email: Some("a@contoso.com".into()),
            name: Some("Ann".into()),
            ..Default::default()
        };
        assert_eq!(claims.display_name(), Some("Ann"));
        assert_eq!(TokenClaims::default().display_name(), None);
    }

    #[test]
    fn expires_at_from_exp() {
        let claims = TokenClaims {
            exp: Some(1_700_000_000),
            ..Default::default()
        };
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
    }
}
