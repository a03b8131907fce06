//! Chat relay: widget turn to Gemini and back, saving the transcript.
//!
//! DESIGN
//! ======
//! Every upstream request starts with a fixed two-turn preamble: a user turn
//! carrying the assistant instructions (organization info and fallback text
//! embedded) and a model turn acknowledging them. The visitor's history
//! follows, then `last_prompt` as the final user turn. The preamble is never
//! shown to the visitor or stored with the lead.
//!
//! ERROR HANDLING
//! ==============
//! Each failure maps to an HTTP status and a [`ChatReply`] whose `result`
//! is safe to show the visitor verbatim; `message` carries the diagnostic.
//! Nothing is retried.

use wire::{ChatReply, ChatRequest, HistoryEntry, Role, Turn};

use super::{leads, settings};
use crate::llm::types::{Content, Generation, LlmError};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;
use crate::store::now_ms;

pub const SYSTEM_ACK: &str = "Okay Sure I will follow all your requirements.";

/// Minimum session id length accepted by the relay (exclusive).
const MIN_SESSION_ID_LEN: usize = 10;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error("API key missing")]
    NotConfigured,
    #[error("internal error: {0}")]
    Internal(String),
    #[error("upstream transport failed: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("prompt blocked: {0}")]
    Blocked(String),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl From<LlmError> for RelayError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ApiResponse { status, message } => Self::Upstream { status, message },
            LlmError::ApiParse(detail) => Self::Malformed(detail),
            LlmError::ApiRequest(detail) | LlmError::HttpClientBuild(detail) | LlmError::ConfigParse(detail) => {
                Self::Transport(detail)
            }
        }
    }
}

impl RelayError {
    /// HTTP status for this failure. Upstream statuses are mirrored.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::Blocked(_) => 400,
            Self::RateLimited(_) => 429,
            Self::NotConfigured => 503,
            Self::Internal(_) | Self::Transport(_) | Self::Malformed(_) => 500,
            Self::Upstream { status, .. } => *status,
        }
    }

    /// Response body for this failure.
    #[must_use]
    pub fn reply(&self) -> ChatReply {
        match self {
            Self::InvalidRequest(detail) => ChatReply::failed(
                format!("Invalid parameter: {detail}"),
                "Sorry, I couldn't process that message. Please refresh the page and try again.",
            ),
            Self::RateLimited(e) => ChatReply::failed(
                e.to_string(),
                "You're sending messages too quickly. Please wait a moment and try again.",
            ),
            Self::NotConfigured => {
                ChatReply::failed("API Key Missing", "Chatbot configuration error. Please contact the site administrator.")
            }
            Self::Internal(detail) => ChatReply::failed(
                detail.clone(),
                "Sorry, there was a technical issue. Please try again later.",
            ),
            Self::Transport(detail) => ChatReply::failed(
                format!("Failed to communicate with the API: {detail}"),
                "Sorry, there was a technical issue connecting to the AI service. Please try again later.",
            ),
            Self::Upstream { status, message } => ChatReply::failed(
                format!("API Error ({status}): {message}"),
                format!("Sorry, the AI service returned an error. Please try again. ({status})"),
            ),
            Self::Blocked(reason) => ChatReply::failed(
                format!("API request blocked: {reason}"),
                format!(
                    "Sorry, your request could not be processed due to safety settings ({reason}). Please rephrase your query."
                ),
            ),
            Self::Malformed(_) => ChatReply::failed(
                "Unexpected response format from API",
                "Sorry, the AI service gave an unexpected response. Please try again.",
            ),
        }
    }
}

// =============================================================================
// RELAY
// =============================================================================

/// Relay one visitor message and return the model's reply text.
///
/// # Errors
///
/// See [`RelayError`]; each variant carries its own status and reply.
pub async fn handle_chat(state: &AppState, req: &ChatRequest) -> Result<String, RelayError> {
    let prompt = validate_request(req)?;
    state.rate_limiter.check_and_record(&req.session_id)?;

    let bot = settings::load(state.settings.as_ref())
        .await
        .map_err(|e| RelayError::Internal(e.to_string()))?;

    let api_key = bot
        .api_key()
        .map(str::to_string)
        .or_else(|| state.fallback_api_key.clone())
        .ok_or(RelayError::NotConfigured)?;
    let Some(llm) = &state.llm else {
        tracing::error!("chat relay has no LLM client");
        return Err(RelayError::NotConfigured);
    };

    let contents = build_contents(bot.organization_info(), bot.fallback_response(), &req.conversation_history, prompt);

    let reply = match llm.generate(&api_key, &contents).await {
        Ok(Generation::Reply(text)) => text,
        Ok(Generation::Blocked(reason)) => {
            tracing::warn!(session_id = %req.session_id, %reason, "prompt blocked upstream");
            return Err(RelayError::Blocked(reason));
        }
        Err(e) => {
            tracing::error!(session_id = %req.session_id, error = %e, "LLM call failed");
            return Err(e.into());
        }
    };

    let existing = match state.leads.find_by_session(&req.session_id).await {
        Ok(lead) => lead.map(|l| l.transcript).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(session_id = %req.session_id, error = %e, "transcript lookup failed");
            Vec::new()
        }
    };
    let transcript = merge_transcript(&existing, &req.conversation_history, prompt, &reply, now_ms());
    leads::record_transcript(state.leads.as_ref(), &req.session_id, &transcript).await;

    Ok(reply)
}

/// Returns the trimmed prompt.
fn validate_request(req: &ChatRequest) -> Result<&str, RelayError> {
    let prompt = req.last_prompt.trim();
    if prompt.is_empty() {
        return Err(RelayError::InvalidRequest("last_prompt"));
    }
    let sid = &req.session_id;
    if sid.len() <= MIN_SESSION_ID_LEN || !sid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RelayError::InvalidRequest("session_id"));
    }
    Ok(prompt)
}

/// Assistant instructions sent as the first user turn.
#[must_use]
pub fn system_instruction(organization_info: &str, fallback_response: &str) -> String {
    format!(
        "Hi! I want you to work as an AI assistant for my website. You will be a friendly and smart assistant \
         for our company with good understanding skills. I want you to answer our customers' questions and \
         queries just like a support team member.\n\
         I'll provide you with some important rules and information about our website and company, and based \
         on these, you need to give correct and helpful answers to clients.\n\
         Here are the key rules to remember:\n\
         Only answer questions related to our business and website.\n\
         If you include HTML elements such as links, use single quotes for attribute values, for example \
         <a href='link' target='_blank'></a>.\n\
         If the client's question is outside our scope, or they are tired or not happy with your answers, \
         politely apologize and simply respond with: {fallback_response}. Limit each message or answer to a \
         maximum of 10 words; avoid lengthy responses. Use HTML for links so they are clickable and open in \
         a new tab.\n\
         Here is the basic information about our website: ###{organization_info}###"
    )
}

/// Preamble, visitor history, then the new prompt.
fn build_contents(organization_info: &str, fallback_response: &str, history: &[HistoryEntry], prompt: &str) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len() + 3);
    contents.push(Content::text(Role::User, system_instruction(organization_info, fallback_response)));
    contents.push(Content::text(Role::Model, SYSTEM_ACK));
    contents.extend(history.iter().map(Content::from));
    contents.push(Content::text(Role::User, prompt));
    contents
}

/// Visitor-visible transcript after this exchange.
///
/// History entries that match the stored transcript position-for-position
/// keep their stored timestamps; everything else is stamped `now`.
fn merge_transcript(existing: &[Turn], history: &[HistoryEntry], prompt: &str, reply: &str, now: i64) -> Vec<Turn> {
    let mut turns: Vec<Turn> = history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let timestamp = existing
                .get(i)
                .filter(|t| t.role == entry.role && t.text() == entry.text())
                .map_or(now, |t| t.timestamp);
            Turn::new(entry.role, entry.text(), timestamp)
        })
        .collect();
    turns.push(Turn::new(Role::User, prompt, now));
    turns.push(Turn::new(Role::Model, reply, now));
    turns
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
