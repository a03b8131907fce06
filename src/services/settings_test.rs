use super::*;
use crate::store::MemoryStore;

fn assets() -> AssetDefaults {
    AssetDefaults::new("https://cdn.example.test/")
}

fn stored(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

// =============================================================================
// bot_config
// =============================================================================

#[test]
fn defaults_produce_stock_config() {
    let config = BotSettings::from_stored(HashMap::new()).bot_config(&assets());

    assert!(config.enabled);
    assert_eq!(config.header_title, "Shuriken AI Chatbot");
    assert_eq!(config.startup_message, "Hi, How are you?");
    assert_eq!(config.font_size, "16");
    assert_eq!(config.theme_color, "#00665E");
    assert_eq!(config.position, WidgetPosition::BottomRight);
    assert_eq!(config.user_avatar_url, "https://cdn.example.test/assets/images/user-avatar.png");
    assert_eq!(config.bot_avatar_url, "https://cdn.example.test/assets/images/bot-logo.png");

    let prompts: Vec<_> = config.quick_replies.iter().map(|q| q.prompt.as_str()).collect();
    assert_eq!(prompts, ["I want your help !!", "I want some Discounts"]);
}

#[test]
fn only_zero_disables() {
    for (raw, expected) in [("0", false), (" 0 ", false), ("1", true), ("", true), ("yes", true)] {
        let settings = BotSettings::from_stored(stored(&[(CHATBOT_ENABLED, raw)]));
        assert_eq!(settings.enabled(), expected, "chatbot_enabled={raw:?}");
    }
}

#[test]
fn empty_avatar_falls_back_to_asset_default() {
    let settings = BotSettings::from_stored(stored(&[(USER_IMAGE, "  "), (BOT_IMAGE, "https://x.test/bot.png")]));
    let config = settings.bot_config(&assets());
    assert_eq!(config.user_avatar_url, "https://cdn.example.test/assets/images/user-avatar.png");
    assert_eq!(config.bot_avatar_url, "https://x.test/bot.png");
}

#[test]
fn cleared_buttons_stay_cleared_and_blank_ones_drop() {
    let settings = BotSettings::from_stored(stored(&[
        ("button_1_query", ""),
        ("button_2_query", "   "),
        ("button_4_query", "  Book a demo "),
    ]));
    let config = settings.bot_config(&assets());
    assert_eq!(config.quick_replies.len(), 1);
    assert_eq!(config.quick_replies[0].text, "Book a demo");
    assert_eq!(config.quick_replies[0].prompt, "Book a demo");
}

#[test]
fn unknown_stored_keys_are_ignored() {
    let settings = BotSettings::from_stored(stored(&[("legacy_thing", "x")]));
    assert!(!settings.masked().contains_key("legacy_thing"));
}

#[test]
fn invalid_stored_position_uses_default() {
    let settings = BotSettings::from_stored(stored(&[(CHATBOT_POSITION, "top-left")]));
    assert_eq!(settings.position(), WidgetPosition::BottomRight);
}

#[test]
fn api_key_blank_is_none() {
    assert_eq!(BotSettings::from_stored(HashMap::new()).api_key(), None);
    let settings = BotSettings::from_stored(stored(&[(GEMINI_API_KEY, " AIzaKey ")]));
    assert_eq!(settings.api_key(), Some("AIzaKey"));
}

// =============================================================================
// masking
// =============================================================================

#[test]
fn masked_hides_api_key() {
    let settings = BotSettings::from_stored(stored(&[(GEMINI_API_KEY, "AIzaSyExampleKey1234")]));
    let view = settings.masked();
    assert_eq!(view[GEMINI_API_KEY], "********1234");
    assert_eq!(view[HEADER_TITLE], "Shuriken AI Chatbot");
    assert_eq!(view.len(), 15);
}

#[test]
fn mask_secret_short_and_empty() {
    assert_eq!(mask_secret(""), "");
    assert_eq!(mask_secret("abc"), "********");
}

// =============================================================================
// validate_update / update
// =============================================================================

#[test]
fn validate_rejects_unknown_key() {
    let err = validate_update(stored(&[("font_size", "20")])).unwrap_err();
    assert!(matches!(err, SettingsError::UnknownKey(ref k) if k == "font_size"));
}

#[test]
fn validate_theme_color() {
    assert!(validate_update(stored(&[(THEME_COLOR, "#abc")])).is_ok());
    assert!(validate_update(stored(&[(THEME_COLOR, "#A1B2C3")])).is_ok());
    for bad in ["abc", "#abcd", "#ggg", "red"] {
        let err = validate_update(stored(&[(THEME_COLOR, bad)])).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }), "{bad}");
    }
}

#[test]
fn validate_position_and_enabled() {
    assert!(validate_update(stored(&[(CHATBOT_POSITION, "bottom-left")])).is_ok());
    assert!(validate_update(stored(&[(CHATBOT_POSITION, "middle")])).is_err());
    assert!(validate_update(stored(&[(CHATBOT_ENABLED, "0")])).is_ok());
    assert!(validate_update(stored(&[(CHATBOT_ENABLED, "true")])).is_err());
}

#[test]
fn validate_collapses_single_line_fields() {
    let out = validate_update(stored(&[(HEADER_TITLE, "  Ask   us\nanything ")])).unwrap();
    assert_eq!(out, vec![(HEADER_TITLE.to_string(), "Ask us anything".to_string())]);
}

#[test]
fn validate_keeps_multiline_text() {
    let out = validate_update(stored(&[(ORGANIZATION_INFO, "Line one\nLine two")])).unwrap();
    assert_eq!(out[0].1, "Line one\nLine two");
}

#[test]
fn validate_skips_masked_api_key() {
    let out = validate_update(stored(&[(GEMINI_API_KEY, "********1234"), (HEADER_TITLE, "Hi")])).unwrap();
    assert_eq!(out, vec![(HEADER_TITLE.to_string(), "Hi".to_string())]);
}

#[tokio::test]
async fn update_is_all_or_nothing() {
    let store = MemoryStore::new();
    let err = update(&store, stored(&[(HEADER_TITLE, "New"), (THEME_COLOR, "blue")])).await;
    assert!(err.is_err());
    assert!(SettingsStore::all(&store).await.unwrap().is_empty());

    update(&store, stored(&[(HEADER_TITLE, "New"), (THEME_COLOR, "#123456")])).await.unwrap();
    let config = load_bot_config(&store, &assets()).await.unwrap();
    assert_eq!(config.header_title, "New");
    assert_eq!(config.theme_color, "#123456");
}

// =============================================================================
// widget_css
// =============================================================================

#[test]
fn css_bottom_right() {
    let config = BotSettings::from_stored(HashMap::new()).bot_config(&assets());
    let css = widget_css(&config);
    assert!(css.contains("--chatbot-position-right: 3%;"));
    assert!(css.contains("--chatbot-theme-color: #00665E;"));
    assert!(!css.contains("@media"));
}

#[test]
fn css_bottom_left_has_mobile_block() {
    let settings = BotSettings::from_stored(stored(&[(CHATBOT_POSITION, "bottom-left"), (THEME_COLOR, "#ff0000")]));
    let css = widget_css(&settings.bot_config(&assets()));
    assert!(css.contains("--chatbot-image-position-right: 93%;"));
    assert!(css.contains("@media (max-width: 768px)"));
    assert!(css.contains("--chatbot-position-right-mob: 71%;"));
    assert!(css.contains("--chatbot-theme-color: #ff0000;"));
}

#[test]
fn css_replaces_invalid_theme_color() {
    let mut config = BotSettings::from_stored(HashMap::new()).bot_config(&assets());
    config.theme_color = "red;}body{display:none".into();
    assert!(widget_css(&config).contains("--chatbot-theme-color: #00665E;"));
}
