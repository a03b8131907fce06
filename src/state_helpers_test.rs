use super::*;
use std::sync::Mutex;

use crate::llm::types::{Content, Generation, LlmError};
use crate::rate_limit::RateLimitConfig;
use crate::store::{MemoryStore, NewLead};

pub const TEST_SESSION: &str = "17000000000001234";
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

// =========================================================================
// MockLlm
// =========================================================================

/// Scripted LLM: pops one canned outcome per call and records the request.
pub struct MockLlm {
    responses: Mutex<Vec<Result<Generation, LlmError>>>,
    pub calls: Mutex<Vec<(String, Vec<Content>)>>,
}

impl MockLlm {
    #[must_use]
    pub fn new(responses: Vec<Result<Generation, LlmError>>) -> Self {
        Self { responses: Mutex::new(responses), calls: Mutex::new(Vec::new()) }
    }

    #[must_use]
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(Generation::Reply(text.to_string()))])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_contents(&self) -> Vec<Content> {
        self.calls.lock().unwrap().last().map(|(_, c)| c.clone()).unwrap_or_default()
    }

    pub fn last_api_key(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(k, _)| k.clone())
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn generate(&self, api_key: &str, contents: &[Content]) -> Result<Generation, LlmError> {
        self.calls.lock().unwrap().push((api_key.to_string(), contents.to_vec()));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { Ok(Generation::Reply("done".into())) } else { responses.remove(0) }
    }
}

// =========================================================================
// AppState builders
// =========================================================================

/// Create a test `AppState` over a fresh `MemoryStore`, no LLM.
#[must_use]
pub fn test_app_state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), None)
}

/// Create a test `AppState` with a mock LLM and a configured API key.
pub async fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> AppState {
    let state = AppState::new(Arc::new(MemoryStore::new()), Some(llm));
    state
        .settings
        .put_many(&[("gemini_api_key".into(), "test-key".into())])
        .await
        .unwrap();
    state
}

/// Tight limits for rate-limit tests.
#[must_use]
pub fn tight_rate_limiter(per_session: usize) -> RateLimiter {
    RateLimiter::with_config(RateLimitConfig { per_session_limit: per_session, ..RateLimitConfig::default() })
}

/// Insert a lead for `session_id` and return its id.
pub async fn seed_lead(state: &AppState, session_id: &str) -> i64 {
    state
        .leads
        .create(NewLead {
            session_id: session_id.into(),
            name: "Alice".into(),
            email: "a@b.com".into(),
            phone: "+1234567".into(),
            query: "hello".into(),
            page_url: "https://example.test/".into(),
            country: "Unknown Country".into(),
        })
        .await
        .unwrap()
}
