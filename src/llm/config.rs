//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// All optional:
    /// - `GEMINI_MODEL`: default `gemini-2.5-flash`
    /// - `GEMINI_BASE_URL`: default public v1beta endpoint
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 60
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// The API key is not part of this config; it is read from the settings
    /// store on every request.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] if the model name is blank or the
    /// base URL is not http(s).
    pub fn from_env() -> Result<Self, LlmError> {
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let model = parse_model(&model)?;
        let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url)?;
        let timeouts = LlmTimeouts {
            request_secs: crate::env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: crate::env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { model, base_url, timeouts })
    }
}

fn parse_model(raw: &str) -> Result<String, LlmError> {
    let model = raw.trim();
    if model.is_empty() || model.contains('/') {
        return Err(LlmError::ConfigParse(format!("invalid GEMINI_MODEL: '{raw}'")));
    }
    Ok(model.to_string())
}

fn parse_base_url(raw: &str) -> Result<String, LlmError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(LlmError::ConfigParse(format!("GEMINI_BASE_URL must be http(s): '{raw}'")));
    }
    Ok(url.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
