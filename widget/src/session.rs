//! Per-page-load session identifier and the widget clock.

use std::fmt;

/// Random suffixes are kept below this bound.
const SUFFIX_MODULUS: u32 = 10_000;

/// Numeric session id: millisecond timestamp followed by a random suffix.
///
/// Unique enough for one lead per page load; not a secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn from_parts(timestamp_ms: i64, random: u32) -> Self {
        Self(format!("{}{}", timestamp_ms.max(0), random % SUFFIX_MODULUS))
    }

    /// Generate from the current clock and `Math.random()`.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn generate() -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let random = (js_sys::Math::random() * f64::from(SUFFIX_MODULUS)) as u32;
        Self::from_parts(now_ms(), random)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(feature = "hydrate")]
#[must_use]
pub fn now_ms() -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let now = js_sys::Date::now() as i64;
    now
}

/// Milliseconds since the Unix epoch.
#[cfg(not(feature = "hydrate"))]
#[must_use]
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
