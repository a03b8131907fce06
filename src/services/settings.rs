//! Settings service: bot options and their public projection.
//!
//! DESIGN
//! ======
//! Options are stored as raw strings under a fixed set of keys. Reads layer
//! stored values over built-in defaults; a key that was never written takes
//! its default, while a key explicitly saved as empty stays empty (so a
//! cleared quick-reply button does not come back).
//!
//! ERROR HANDLING
//! ==============
//! Admin updates are validated as a batch before anything is written: one
//! unknown key or malformed value rejects the whole update.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use wire::{BotConfig, QuickReply, WidgetPosition};

use crate::store::{SettingsStore, StoreError};

// =============================================================================
// KEYS & DEFAULTS
// =============================================================================

pub const GEMINI_API_KEY: &str = "gemini_api_key";
pub const CHATBOT_ENABLED: &str = "chatbot_enabled";
pub const CHATBOT_POSITION: &str = "chatbot_position";
pub const USER_IMAGE: &str = "user_image";
pub const BOT_IMAGE: &str = "bot_image";
pub const HEADER_TITLE: &str = "header_title";
pub const THEME_COLOR: &str = "theme_color";
pub const WELCOME_MESSAGE: &str = "welcome_message";
pub const FALLBACK_RESPONSE: &str = "fallback_response";
pub const ORGANIZATION_INFO: &str = "organization_info";
pub const BUTTON_KEYS: [&str; 5] =
    ["button_1_query", "button_2_query", "button_3_query", "button_4_query", "button_5_query"];

/// Every key the admin API accepts, with its default.
const DEFAULTS: [(&str, &str); 15] = [
    (GEMINI_API_KEY, ""),
    (CHATBOT_ENABLED, "1"),
    (CHATBOT_POSITION, "bottom-right"),
    (USER_IMAGE, ""),
    (BOT_IMAGE, ""),
    (HEADER_TITLE, "Shuriken AI Chatbot"),
    (THEME_COLOR, "#00665E"),
    (WELCOME_MESSAGE, "Hi, How are you?"),
    (
        FALLBACK_RESPONSE,
        "I'm sorry, I didn't catch that. Could you rephrase? Feel free to ask something else.",
    ),
    (ORGANIZATION_INFO, "No Company Information, Continue with your own knowledge"),
    ("button_1_query", "I want your help !!"),
    ("button_2_query", "I want some Discounts"),
    ("button_3_query", ""),
    ("button_4_query", ""),
    ("button_5_query", ""),
];

/// The widget has no font-size option; it always gets this.
const FONT_SIZE: &str = "16";

const MASK: &str = "********";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Default avatar URLs, served from the static asset base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDefaults {
    pub user_avatar_url: String,
    pub bot_avatar_url: String,
}

impl AssetDefaults {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            user_avatar_url: format!("{base}/assets/images/user-avatar.png"),
            bot_avatar_url: format!("{base}/assets/images/bot-logo.png"),
        }
    }

    /// `ASSET_BASE_URL`, default empty (same-origin `/assets/...`).
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(&std::env::var("ASSET_BASE_URL").unwrap_or_default())
    }
}

/// Stored options merged over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    values: HashMap<String, String>,
}

impl BotSettings {
    #[must_use]
    pub fn from_stored(stored: HashMap<String, String>) -> Self {
        let mut values: HashMap<String, String> =
            DEFAULTS.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        for (key, value) in stored {
            if values.contains_key(&key) {
                values.insert(key, value);
            }
        }
        Self { values }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Trimmed API key, `None` when blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        Some(self.get(GEMINI_API_KEY).trim()).filter(|k| !k.is_empty())
    }

    /// Only an explicit `0` disables the bot.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.get(CHATBOT_ENABLED).trim() != "0"
    }

    #[must_use]
    pub fn position(&self) -> WidgetPosition {
        WidgetPosition::parse(self.get(CHATBOT_POSITION)).unwrap_or_default()
    }

    #[must_use]
    pub fn fallback_response(&self) -> &str {
        self.get(FALLBACK_RESPONSE)
    }

    #[must_use]
    pub fn organization_info(&self) -> &str {
        self.get(ORGANIZATION_INFO)
    }

    /// Project onto the public `BotConfig`.
    #[must_use]
    pub fn bot_config(&self, assets: &AssetDefaults) -> BotConfig {
        let or_default = |key: &str, fallback: &str| match self.get(key).trim() {
            "" => fallback.to_string(),
            url => url.to_string(),
        };

        let quick_replies = BUTTON_KEYS
            .iter()
            .map(|key| self.get(key).trim())
            .filter(|text| !text.is_empty())
            .map(|text| QuickReply { text: text.to_string(), prompt: text.to_string() })
            .collect();

        BotConfig {
            enabled: self.enabled(),
            header_title: self.get(HEADER_TITLE).to_string(),
            startup_message: self.get(WELCOME_MESSAGE).to_string(),
            font_size: FONT_SIZE.to_string(),
            user_avatar_url: or_default(USER_IMAGE, &assets.user_avatar_url),
            bot_avatar_url: or_default(BOT_IMAGE, &assets.bot_avatar_url),
            quick_replies,
            theme_color: self.get(THEME_COLOR).to_string(),
            position: self.position(),
        }
    }

    /// Admin view: every key, API key masked.
    #[must_use]
    pub fn masked(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| {
                let shown = if k == GEMINI_API_KEY { mask_secret(v) } else { v.clone() };
                (k.clone(), shown)
            })
            .collect()
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Load settings from the store, merged over defaults.
///
/// # Errors
///
/// Returns a store error if the read fails.
pub async fn load(store: &dyn SettingsStore) -> Result<BotSettings, SettingsError> {
    Ok(BotSettings::from_stored(store.all().await?))
}

/// Load the public widget configuration.
///
/// # Errors
///
/// Returns a store error if the read fails.
pub async fn load_bot_config(store: &dyn SettingsStore, assets: &AssetDefaults) -> Result<BotConfig, SettingsError> {
    Ok(load(store).await?.bot_config(assets))
}

/// Validate and persist an admin update.
///
/// A `gemini_api_key` equal to the masked placeholder is ignored, so an
/// admin form that round-trips the masked value does not wipe the key.
///
/// # Errors
///
/// [`SettingsError::UnknownKey`] / [`SettingsError::InvalidValue`] before
/// any write; a store error if the write fails.
pub async fn update(store: &dyn SettingsStore, entries: HashMap<String, String>) -> Result<(), SettingsError> {
    let normalized = validate_update(entries)?;
    if normalized.is_empty() {
        return Ok(());
    }
    store.put_many(&normalized).await?;
    tracing::info!(keys = normalized.len(), "settings updated");
    Ok(())
}

/// Check every entry and return the normalized pairs to store.
///
/// # Errors
///
/// Returns the first invalid entry found, in key order.
pub fn validate_update(entries: HashMap<String, String>) -> Result<Vec<(String, String)>, SettingsError> {
    let mut sorted: Vec<(String, String)> = entries.into_iter().collect();
    sorted.sort();

    let mut normalized = Vec::with_capacity(sorted.len());
    for (key, value) in sorted {
        if !DEFAULTS.iter().any(|(k, _)| *k == key) {
            return Err(SettingsError::UnknownKey(key));
        }
        let value = normalize_value(&key, &value)?;
        if key == GEMINI_API_KEY && value.starts_with(MASK) {
            continue;
        }
        normalized.push((key, value));
    }
    Ok(normalized)
}

fn normalize_value(key: &str, raw: &str) -> Result<String, SettingsError> {
    let value = raw.trim();
    let invalid = |reason: &str| SettingsError::InvalidValue { key: key.to_string(), reason: reason.to_string() };

    match key {
        CHATBOT_ENABLED => match value {
            "0" | "1" => Ok(value.to_string()),
            _ => Err(invalid("expected 0 or 1")),
        },
        CHATBOT_POSITION => WidgetPosition::parse(value)
            .map(|p| p.as_str().to_string())
            .ok_or_else(|| invalid("expected bottom-right or bottom-left")),
        THEME_COLOR => {
            if is_hex_color(value) {
                Ok(value.to_string())
            } else {
                Err(invalid("expected #rgb or #rrggbb"))
            }
        }
        USER_IMAGE | BOT_IMAGE => {
            if value.is_empty() || value.starts_with("https://") || value.starts_with("http://") || value.starts_with('/')
            {
                Ok(value.to_string())
            } else {
                Err(invalid("expected an http(s) or root-relative URL"))
            }
        }
        WELCOME_MESSAGE | FALLBACK_RESPONSE | ORGANIZATION_INFO => Ok(value.to_string()),
        // Single-line fields.
        _ => Ok(value.split_whitespace().collect::<Vec<_>>().join(" ")),
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn mask_secret(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return String::new();
    }
    let tail: String = secret.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if secret.chars().count() <= 8 { MASK.to_string() } else { format!("{MASK}{tail}") }
}

// =============================================================================
// WIDGET CSS
// =============================================================================

/// CSS custom properties for launcher placement and theme color.
#[must_use]
pub fn widget_css(config: &BotConfig) -> String {
    let (image_right, window_right, mobile) = match config.position {
        WidgetPosition::BottomRight => ("3%", "3%", None),
        WidgetPosition::BottomLeft => ("93%", "71%", Some(("75%", "71%"))),
    };
    let theme = if is_hex_color(&config.theme_color) { config.theme_color.as_str() } else { "#00665E" };

    let mut css = String::new();
    let _ = writeln!(css, ":root {{");
    let _ = writeln!(css, "    --chatbot-image-position-right: {image_right};");
    let _ = writeln!(css, "    --chatbot-position-right: {window_right};");
    let _ = writeln!(css, "    --chatbot-theme-color: {theme};");
    let _ = writeln!(css, "}}");
    if let Some((image_mob, window_mob)) = mobile {
        let _ = writeln!(css, "@media (max-width: 768px) {{");
        let _ = writeln!(css, "    :root {{");
        let _ = writeln!(css, "        --chatbot-image-position-right-mob: {image_mob};");
        let _ = writeln!(css, "        --chatbot-position-right-mob: {window_mob};");
        let _ = writeln!(css, "    }}");
        let _ = writeln!(css, "}}");
    }
    css
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
