//! LLM: Gemini adapter for the chat relay.
//!
//! DESIGN
//! ======
//! Environment variables pick the model, endpoint and timeouts; the API key
//! comes from the settings store per call. `LlmClient` is the concrete
//! implementation of [`LlmChat`]; tests substitute their own.

pub mod config;
pub mod gemini;
pub mod types;

use config::LlmConfig;
pub use types::LlmChat;
use types::{Content, Generation, LlmError};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by the Gemini `generateContent` API.
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a config value is invalid or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = gemini::GeminiClient::new(config.base_url, config.timeouts)?;
        Ok(Self { inner, model: config.model })
    }

    /// Return the configured model name (e.g. `"gemini-2.5-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn generate(&self, api_key: &str, contents: &[Content]) -> Result<Generation, LlmError> {
        self.inner.generate(&self.model, api_key, contents).await
    }
}
