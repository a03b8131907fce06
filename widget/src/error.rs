//! Widget error taxonomy and the visitor-facing text for each failure.

/// Shown when the chat request never reached the server.
pub const NETWORK_FALLBACK: &str = "Sorry, I couldn't connect to the server. Please check your internet connection.";
/// Non-2xx chat response carrying neither `result` nor `message`.
pub const SERVER_FALLBACK: &str = "Sorry, there was a server communication error.";
/// 2xx chat response that is unsuccessful, lacks `result`, or does not parse.
pub const GENERATION_FALLBACK: &str = "Sorry, I couldn't generate a response.";

pub const LEAD_SAVE_FALLBACK: &str = "Could not save your information. Please try again.";
pub const LEAD_NETWORK_FALLBACK: &str =
    "An error occurred while saving your details. Please check your connection and try again.";
pub const CONFIG_LOAD_FAILED: &str = "Oops! Could not load chatbot configuration.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}")]
    Server { status: u16, result: Option<String>, message: Option<String> },
    #[error("request rejected")]
    Rejected { result: Option<String>, message: Option<String> },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("page error: {0}")]
    Dom(String),
}

impl WidgetError {
    /// Text appended as a `model` turn when a chat request fails.
    #[must_use]
    pub fn chat_fallback(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_FALLBACK.to_string(),
            Self::Server { result, message, .. } => {
                first_text(result.as_deref(), message.as_deref()).unwrap_or(SERVER_FALLBACK).to_string()
            }
            Self::Rejected { result, message } => {
                first_text(result.as_deref(), message.as_deref()).unwrap_or(GENERATION_FALLBACK).to_string()
            }
            Self::Malformed(_) | Self::Storage(_) | Self::Dom(_) => GENERATION_FALLBACK.to_string(),
        }
    }

    /// Alert text when lead creation fails.
    #[must_use]
    pub fn lead_alert(&self) -> String {
        match self {
            Self::Network(_) => LEAD_NETWORK_FALLBACK.to_string(),
            Self::Server { message, .. } | Self::Rejected { message, .. } => match non_blank(message.as_deref()) {
                Some(m) => format!("Error: {m}"),
                None => format!("Error: {LEAD_SAVE_FALLBACK}"),
            },
            Self::Malformed(_) | Self::Storage(_) | Self::Dom(_) => format!("Error: {LEAD_SAVE_FALLBACK}"),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn first_text<'a>(result: Option<&'a str>, message: Option<&'a str>) -> Option<&'a str> {
    non_blank(result).or_else(|| non_blank(message))
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
