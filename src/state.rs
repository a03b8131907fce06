//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Storage sits behind trait objects so the same handlers run against
//! Postgres in production and the in-memory store in tests or when no
//! database is configured.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::llm::LlmChat;
use crate::rate_limit::RateLimiter;
use crate::services::geo::GeoLocator;
use crate::services::settings::AssetDefaults;
use crate::store::{LeadStore, SettingsStore};

// =============================================================================
// ADMIN TOKEN
// =============================================================================

/// Bearer token guarding the admin API. Only its digest is kept.
#[derive(Clone)]
pub struct AdminToken {
    digest: [u8; 32],
}

impl AdminToken {
    /// `None` for a blank token, which leaves the admin API disabled.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self { digest: digest(raw) })
    }

    /// Constant-time comparison of digests.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let other = digest(candidate.trim());
        self.digest
            .iter()
            .zip(other.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

fn digest(raw: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hasher.finalize().into()
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub leads: Arc<dyn LeadStore>,
    pub settings: Arc<dyn SettingsStore>,
    /// Optional LLM client. `None` if the HTTP client could not be built.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub geo: GeoLocator,
    /// In-memory rate limiter for chat relay requests.
    pub rate_limiter: RateLimiter,
    pub assets: AssetDefaults,
    /// `None` disables the admin API.
    pub admin_token: Option<AdminToken>,
    /// `GEMINI_API_KEY`, used when the settings store has no key.
    pub fallback_api_key: Option<String>,
}

impl AppState {
    /// State backed by a single store implementing both traits.
    #[must_use]
    pub fn new<S>(store: Arc<S>, llm: Option<Arc<dyn LlmChat>>) -> Self
    where
        S: LeadStore + SettingsStore + 'static,
    {
        Self {
            leads: store.clone(),
            settings: store,
            llm,
            geo: GeoLocator::disabled(),
            rate_limiter: RateLimiter::default(),
            assets: AssetDefaults::new(""),
            admin_token: None,
            fallback_api_key: None,
        }
    }

    #[must_use]
    pub fn with_geo(mut self, geo: GeoLocator) -> Self {
        self.geo = geo;
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: AssetDefaults) -> Self {
        self.assets = assets;
        self
    }

    #[must_use]
    pub fn with_admin_token(mut self, admin_token: Option<AdminToken>) -> Self {
        self.admin_token = admin_token;
        self
    }

    #[must_use]
    pub fn with_fallback_api_key(mut self, key: Option<String>) -> Self {
        self.fallback_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
