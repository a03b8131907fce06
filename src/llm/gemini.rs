//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper around `POST {base}/models/{model}:generateContent`.
//! Pure parsing in `parse_response` / `parse_error_message` for testability.

use std::time::Duration;

use serde::Deserialize;

use super::config::LlmTimeouts;
use super::types::{Content, Generation, LlmError};

const API_KEY_HEADER: &str = "x-goog-api-key";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the TLS backend fails to initialise.
    pub fn new(base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub async fn generate(&self, model: &str, api_key: &str, contents: &[Content]) -> Result<Generation, LlmError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = ApiRequest { contents };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, message: parse_error_message(&text) });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

/// Interpret a 200 body: first candidate text wins, then a block reason.
fn parse_response(json: &str) -> Result<Generation, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let text = api
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);
    if let Some(text) = text {
        return Ok(Generation::Reply(text));
    }

    if let Some(reason) = api.prompt_feedback.and_then(|f| f.block_reason) {
        return Ok(Generation::Blocked(reason));
    }

    Err(LlmError::ApiParse("response has no candidate text".into()))
}

/// Extract `error.message` from a non-200 body.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| "Unknown API error".to_string())
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
