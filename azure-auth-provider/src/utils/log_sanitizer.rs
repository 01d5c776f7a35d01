//! Log sanitization utilities
//!
//! Keeps bearer tokens, refresh tokens and oversized payloads out of
//! debug/error logs.

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// JSON fields whose string values are replaced by [`redact_secrets`].
const SECRET_FIELDS: [&str; 3] = ["access_token", "refresh_token", "id_token"];

const REDACTED: &str = "<redacted>";

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` characters with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Replace the string values of token fields in a JSON (or JSON-like) body.
///
/// Matching is textual: `"access_token":"..."` (whitespace after the colon allowed)
/// becomes `"access_token":"<redacted>"`. Non-string values are left alone.
pub fn redact_secrets(body: &str) -> String {
    let mut out = body.to_string();
    for field in SECRET_FIELDS {
        out = redact_field(&out, field);
    }
    out
}

fn redact_field(body: &str, field: &str) -> String {
    let needle = format!("\"{field}\"");
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(pos) = rest.find(&needle) {
        let after_key = pos + needle.len();
        out.push_str(&rest[..after_key]);
        rest = &rest[after_key..];

        let trimmed = rest.trim_start();
        let Some(after_colon) = trimmed.strip_prefix(':') else {
            continue;
        };
        let value = after_colon.trim_start();
        let Some(inner) = value.strip_prefix('"') else {
            continue;
        };
        let Some(end) = inner.find('"') else {
            continue;
        };

        out.push_str(":\"");
        out.push_str(REDACTED);
        out.push('"');
        rest = &inner[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Sanitize a response body for logging: redact tokens, then truncate.
pub fn sanitize_body(body: &str) -> String {
    truncate_for_log(&redact_secrets(body))
}

/// Show only the first few characters of a secret.
pub fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        return "*".repeat(token.len());
    }
    format!("{}***", &token[..floor_char_boundary(token, 4)])
}
