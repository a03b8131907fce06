//! Shared JSON contract between the chat server, the widget, and the CLI.
//!
//! This crate owns the request/response bodies of the three public endpoints
//! (config, chat relay, lead capture) and the persisted transcript shape.
//! Several JSON keys keep their legacy spelling (`botStatus`,
//! `StartUpMessage`, `commonButtons`, `lead_id`) so existing embeds keep
//! working against this server.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upper bound on configured quick-reply buttons.
pub const MAX_QUICK_REPLIES: usize = 5;

/// `local@domain.tld` with no whitespace. The widget and the server both
/// check lead emails against this, so they agree on what is valid.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// =============================================================================
// CONVERSATION
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The visitor.
    User,
    /// The language model (or a fallback standing in for it).
    Model,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// Text payload of a turn. Serialized as an object, not an array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One entry of `conversation_history` as sent by the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub parts: Part,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self { role, parts: Part { text: text.into() } }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.parts.text
    }
}

/// A timestamped turn, as kept in the widget and persisted with a lead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Part,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>, timestamp: i64) -> Self {
        Self { role, parts: Part { text: text.into() }, timestamp }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.parts.text
    }

    /// Drop the timestamp, producing the shape replayed to the relay.
    #[must_use]
    pub fn to_history(&self) -> HistoryEntry {
        HistoryEntry { role: self.role, parts: self.parts.clone() }
    }
}

// =============================================================================
// CHAT RELAY
// =============================================================================

/// `POST /api/chat-bot` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub last_prompt: String,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(alias = "lead_id")]
    pub session_id: String,
}

/// `POST /api/chat-bot` response body, for both success and failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChatReply {
    #[must_use]
    pub fn ok(result: impl Into<String>) -> Self {
        Self { success: true, result: Some(result.into()), message: None }
    }

    /// Failure reply. `message` is diagnostic; `result` is shown to the visitor.
    #[must_use]
    pub fn failed(message: impl Into<String>, result: impl Into<String>) -> Self {
        Self { success: false, result: Some(result.into()), message: Some(message.into()) }
    }
}

// =============================================================================
// BOT CONFIGURATION
// =============================================================================

/// Corner the launcher bubble is pinned to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
}

impl WidgetPosition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "bottom-right" => Some(Self::BottomRight),
            "bottom-left" => Some(Self::BottomLeft),
            _ => None,
        }
    }
}

/// A configured quick-reply button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    #[serde(rename = "buttonText")]
    pub text: String,
    #[serde(rename = "buttonPrompt")]
    pub prompt: String,
}

/// `GET /api/chat-bot-config` response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(rename = "botStatus", with = "status_flag")]
    pub enabled: bool,
    #[serde(rename = "headerTitle", default)]
    pub header_title: String,
    #[serde(rename = "StartUpMessage", default)]
    pub startup_message: String,
    #[serde(rename = "fontSize", default)]
    pub font_size: String,
    #[serde(rename = "userAvatarURL", default)]
    pub user_avatar_url: String,
    #[serde(rename = "botImageURL", default)]
    pub bot_avatar_url: String,
    #[serde(rename = "commonButtons", default)]
    pub quick_replies: Vec<QuickReply>,
    #[serde(rename = "themeColor", default)]
    pub theme_color: String,
    #[serde(default)]
    pub position: WidgetPosition,
}

impl BotConfig {
    /// Non-blank quick replies, trimmed, at most [`MAX_QUICK_REPLIES`].
    #[must_use]
    pub fn quick_replies(&self) -> Vec<QuickReply> {
        self.quick_replies
            .iter()
            .filter(|b| !b.prompt.trim().is_empty())
            .take(MAX_QUICK_REPLIES)
            .map(|b| {
                let prompt = b.prompt.trim().to_owned();
                let text = match b.text.trim() {
                    "" => prompt.clone(),
                    t => t.to_owned(),
                };
                QuickReply { text, prompt }
            })
            .collect()
    }

    /// Font size in pixels, if it parses and is within a readable range.
    #[must_use]
    pub fn font_size_px(&self) -> Option<u32> {
        let size = self.font_size.trim().parse::<u32>().ok()?;
        (size > 8 && size < 30).then_some(size)
    }
}

/// `botStatus` is a 0/1 integer on the wire; older payloads send strings or bools.
mod status_flag {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(enabled: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*enabled))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = serde_json::Value::deserialize(d)?;
        Ok(match raw {
            serde_json::Value::Bool(b) => b,
            serde_json::Value::Number(n) => n.as_f64() == Some(1.0),
            serde_json::Value::String(s) => s.trim() == "1",
            _ => false,
        })
    }
}

// =============================================================================
// LEAD CAPTURE
// =============================================================================

/// `POST /api/leads` request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLeadRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current_page_url: String,
    #[serde(default)]
    pub lead_id: String,
}

/// Payload nested under `data` in a [`LeadEnvelope`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadEnvelopeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /api/leads` response body. Errors always carry `data.message`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: LeadEnvelopeData,
}

impl LeadEnvelope {
    #[must_use]
    pub fn created(post_id: i64) -> Self {
        Self {
            success: true,
            data: LeadEnvelopeData { post_id: Some(post_id), message: Some("Entry saved successfully.".into()) },
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, data: LeadEnvelopeData { post_id: None, message: Some(message.into()) } }
    }

    /// Error text for a failed envelope; `None` on success.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.data.message.as_deref()
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
