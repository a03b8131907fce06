//! LLM types: upstream content shape and errors.
//!
//! The relay speaks to the provider in terms of [`Content`] (one role plus
//! an array of parts, as `generateContent` expects) and gets back a
//! [`Generation`]: either reply text or a safety block.

use serde::{Deserialize, Serialize};
use wire::{HistoryEntry, Part, Role};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}: {message}")]
    ApiResponse { status: u16, message: String },

    /// The LLM provider response body could not be interpreted.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// CONTENT
// =============================================================================

/// One upstream turn. Unlike the widget wire shape, `parts` is an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    #[must_use]
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self { role, parts: vec![Part { text: text.into() }] }
    }
}

impl From<&HistoryEntry> for Content {
    fn from(entry: &HistoryEntry) -> Self {
        Self { role: entry.role, parts: vec![entry.parts.clone()] }
    }
}

/// Outcome of a successful upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Text of the first candidate.
    Reply(String),
    /// The prompt was rejected; carries `promptFeedback.blockReason`.
    Blocked(String),
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for content generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Generate a reply for `contents` using `api_key`.
    ///
    /// The key is supplied per call because it lives in the settings store
    /// and may change at runtime.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the provider returns a
    /// non-success status, or the response is malformed.
    async fn generate(&self, api_key: &str, contents: &[Content]) -> Result<Generation, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
