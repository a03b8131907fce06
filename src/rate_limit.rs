//! In-memory rate limiting for chat relay requests.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by the widget session id. Two limits are enforced:
//! - Per-session: 20 relay requests/min
//! - Global: 120 upstream LLM calls/min
//!
//! TRADE-OFFS
//! ==========
//! Session ids are client-generated, so a visitor can dodge the per-session
//! limit by reloading. The global limit is the real cost ceiling; the
//! per-session one only damps runaway widgets and scripted loops.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_PER_SESSION_LIMIT: usize = 20;
const DEFAULT_PER_SESSION_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 120;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

/// Idle sessions are dropped from the map once it grows past this size.
const SESSION_MAP_SWEEP_THRESHOLD: usize = 10_000;

#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
    pub per_session_limit: usize,
    pub per_session_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let per_session_window_secs =
            crate::env_parse("RATE_LIMIT_PER_SESSION_WINDOW_SECS", DEFAULT_PER_SESSION_WINDOW_SECS);
        let global_window_secs = crate::env_parse("RATE_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS);

        Self {
            per_session_limit: crate::env_parse("RATE_LIMIT_PER_SESSION", DEFAULT_PER_SESSION_LIMIT),
            per_session_window: Duration::from_secs(per_session_window_secs),
            global_limit: crate::env_parse("RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(global_window_secs),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_session_limit: DEFAULT_PER_SESSION_LIMIT,
            per_session_window: Duration::from_secs(DEFAULT_PER_SESSION_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-session rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerSessionExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct RateLimiterInner {
    /// Per-session request timestamps.
    session_requests: HashMap<String, VecDeque<Instant>>,
    /// Global request timestamps.
    global_requests: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(RateLimiterInner::default())), config }
    }

    /// Check both per-session and global limits, then record the request.
    ///
    /// # Errors
    ///
    /// Returns the first limit that would be exceeded; nothing is recorded.
    pub fn check_and_record(&self, session_id: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(session_id, Instant::now())
    }

    fn check_and_record_at(&self, session_id: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        if inner.session_requests.len() > SESSION_MAP_SWEEP_THRESHOLD {
            inner.session_requests.retain(|_, deque| {
                prune_window(deque, now, cfg.per_session_window);
                !deque.is_empty()
            });
        }

        let session_deque = inner.session_requests.entry(session_id.to_owned()).or_default();
        prune_window(session_deque, now, cfg.per_session_window);
        if session_deque.len() >= cfg.per_session_limit {
            return Err(RateLimitError::PerSessionExceeded {
                limit: cfg.per_session_limit,
                window_secs: cfg.per_session_window.as_secs(),
            });
        }

        session_deque.push_back(now);
        inner.global_requests.push_back(now);

        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
