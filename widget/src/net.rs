//! Network seam between the widget and the chat server.
//!
//! ERROR HANDLING
//! ==============
//! Response bodies are interpreted here, once, for every transport: a
//! non-2xx status, `success: false`, a missing `result` or an unparseable
//! body all become a [`WidgetError`] the state machine turns into visible
//! text. Nothing in this module panics on bad server output.

use serde::Deserialize;
use wire::{BotConfig, ChatRequest, CreateLeadRequest, LeadEnvelope};

use crate::error::WidgetError;

pub const CONFIG_PATH: &str = "/api/chat-bot-config";
pub const CHAT_PATH: &str = "/api/chat-bot";
pub const LEADS_PATH: &str = "/api/leads";

/// The three endpoints the widget talks to.
#[async_trait::async_trait(?Send)]
pub trait WidgetApi {
    async fn fetch_config(&self) -> Result<BotConfig, WidgetError>;

    /// Returns the new lead id.
    async fn create_lead(&self, req: &CreateLeadRequest) -> Result<i64, WidgetError>;

    /// Returns the bot's reply text.
    async fn send_chat(&self, req: &ChatRequest) -> Result<String, WidgetError>;
}

/// Lenient reply shape: tolerates missing fields on error bodies.
#[derive(Debug, Default, Deserialize)]
struct LooseReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Interpret a config response.
///
/// # Errors
///
/// Non-2xx status or an unparseable body.
pub fn interpret_config(status: u16, body: &str) -> Result<BotConfig, WidgetError> {
    if !is_success(status) {
        return Err(WidgetError::Server { status, result: None, message: None });
    }
    serde_json::from_str(body).map_err(|e| WidgetError::Malformed(e.to_string()))
}

/// Interpret a chat relay response.
///
/// # Errors
///
/// Any failure shape; see the module docs.
pub fn interpret_chat(status: u16, body: &str) -> Result<String, WidgetError> {
    let parsed = serde_json::from_str::<LooseReply>(body);

    if !is_success(status) {
        let reply = parsed.unwrap_or_default();
        return Err(WidgetError::Server { status, result: reply.result, message: reply.message });
    }

    let reply = parsed.map_err(|e| WidgetError::Malformed(e.to_string()))?;
    match reply.result {
        Some(result) if reply.success && !result.trim().is_empty() => Ok(result),
        result => Err(WidgetError::Rejected { result, message: reply.message }),
    }
}

/// Interpret a create-lead response. Errors read `data.message`.
///
/// # Errors
///
/// `success: false`, a missing id, or an unparseable body.
pub fn interpret_lead(status: u16, body: &str) -> Result<i64, WidgetError> {
    let envelope = match serde_json::from_str::<LeadEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) if !is_success(status) => {
            return Err(WidgetError::Server { status, result: None, message: None });
        }
        Err(e) => return Err(WidgetError::Malformed(e.to_string())),
    };

    if !envelope.success {
        return Err(WidgetError::Rejected { result: None, message: envelope.error_message().map(str::to_string) });
    }
    envelope.data.post_id.ok_or_else(|| WidgetError::Malformed("missing post_id".into()))
}

// =============================================================================
// BROWSER
// =============================================================================

/// `fetch`-backed API for the embedded widget.
#[cfg(feature = "hydrate")]
pub struct HttpApi {
    base_url: String,
}

#[cfg(feature = "hydrate")]
impl HttpApi {
    /// `base_url` without a trailing slash; empty means same origin.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read(resp: gloo_net::http::Response) -> Result<(u16, String), WidgetError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| WidgetError::Network(e.to_string()))?;
        Ok((status, body))
    }

    async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<(u16, String), WidgetError> {
        let resp = gloo_net::http::Request::post(&self.url(path))
            .json(body)
            .map_err(|e| WidgetError::Malformed(e.to_string()))?
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;
        Self::read(resp).await
    }
}

#[cfg(feature = "hydrate")]
#[async_trait::async_trait(?Send)]
impl WidgetApi for HttpApi {
    async fn fetch_config(&self) -> Result<BotConfig, WidgetError> {
        let resp = gloo_net::http::Request::get(&self.url(CONFIG_PATH))
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;
        let (status, body) = Self::read(resp).await?;
        interpret_config(status, &body)
    }

    async fn create_lead(&self, req: &CreateLeadRequest) -> Result<i64, WidgetError> {
        let (status, body) = self.post(LEADS_PATH, req).await?;
        interpret_lead(status, &body)
    }

    async fn send_chat(&self, req: &ChatRequest) -> Result<String, WidgetError> {
        let (status, body) = self.post(CHAT_PATH, req).await?;
        interpret_chat(status, &body)
    }
}

#[cfg(test)]
#[path = "net_test.rs"]
mod tests;
