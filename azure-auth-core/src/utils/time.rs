//! Clock and expiry helpers.
//!
//! Expiry values are Unix epoch **seconds** as returned by the token endpoint.
//! The local clock is read in milliseconds and compared in the same unit.

use chrono::Utc;

/// Tokens with less than this many seconds left count as expired.
pub const EXPIRY_THRESHOLD_SECS: i64 = 300;

/// Current local time in epoch milliseconds.
#[must_use]
pub fn now_epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current local time in epoch seconds (`millis / 1000`).
#[must_use]
pub fn now_epoch_secs() -> i64 {
    now_epoch_millis() / 1000
}

/// Parse an `expires_on` value; blank or non-numeric input yields `None`.
#[must_use]
pub fn parse_expires_on(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Whether a token expiring at `expires_on` is still usable at `now_millis`.
///
/// A missing expiry is never fresh.
#[must_use]
pub fn is_fresh_at(expires_on: Option<i64>, now_millis: i64) -> bool {
    expires_on.is_some_and(|exp| {
        exp.saturating_mul(1000).saturating_sub(now_millis) >= EXPIRY_THRESHOLD_SECS * 1000
    })
}
