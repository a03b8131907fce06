use super::*;
use serde_json::json;

// =============================================================================
// Turn / HistoryEntry
// =============================================================================

#[test]
fn history_entry_serializes_parts_as_object() {
    let entry = HistoryEntry::new(Role::User, "hello");
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value, json!({ "role": "user", "parts": { "text": "hello" } }));
}

#[test]
fn turn_replays_as_history_entry_without_timestamp() {
    let turn = Turn::new(Role::Model, "hi there", 1_700_000_000_000);
    let replayed = serde_json::to_value(turn.to_history()).unwrap();
    assert_eq!(replayed, json!({ "role": "model", "parts": { "text": "hi there" } }));

    let back: HistoryEntry = serde_json::from_value(replayed).unwrap();
    assert_eq!(back.role, Role::Model);
    assert_eq!(back.text(), "hi there");
}

#[test]
fn turn_timestamp_defaults_when_absent() {
    let turn: Turn = serde_json::from_value(json!({ "role": "user", "parts": { "text": "x" } })).unwrap();
    assert_eq!(turn.timestamp, 0);
}

#[test]
fn role_rejects_unknown_value() {
    let result = serde_json::from_value::<Role>(json!("assistant"));
    assert!(result.is_err());
}

// =============================================================================
// ChatRequest / ChatReply
// =============================================================================

#[test]
fn chat_request_accepts_legacy_lead_id_key() {
    let req: ChatRequest = serde_json::from_value(json!({
        "last_prompt": "hi",
        "conversation_history": [],
        "lead_id": "17000000000001234"
    }))
    .unwrap();
    assert_eq!(req.session_id, "17000000000001234");
}

#[test]
fn chat_request_history_defaults_to_empty() {
    let req: ChatRequest = serde_json::from_value(json!({ "last_prompt": "hi", "session_id": "1" })).unwrap();
    assert!(req.conversation_history.is_empty());
}

#[test]
fn chat_reply_failed_carries_both_fields() {
    let reply = ChatReply::failed("API Key Missing", "Chatbot configuration error.");
    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(
        value,
        json!({ "success": false, "result": "Chatbot configuration error.", "message": "API Key Missing" })
    );
}

#[test]
fn chat_reply_ok_omits_message() {
    let value = serde_json::to_value(ChatReply::ok("answer")).unwrap();
    assert_eq!(value, json!({ "success": true, "result": "answer" }));
}

// =============================================================================
// BotConfig
// =============================================================================

fn config_json(status: serde_json::Value) -> serde_json::Value {
    json!({
        "botStatus": status,
        "StartUpMessage": "Hi, How are you?",
        "fontSize": "16",
        "userAvatarURL": "https://example.test/u.png",
        "botImageURL": "https://example.test/b.png",
        "commonButtons": [
            { "buttonText": "Help", "buttonPrompt": "I want your help !!" },
            { "buttonText": "  ", "buttonPrompt": "   " }
        ],
        "headerTitle": "Shuriken AI Chatbot"
    })
}

#[test]
fn bot_config_status_flag_variants() {
    let cases = [
        (json!(1), true),
        (json!(0), false),
        (json!("1"), true),
        (json!("0"), false),
        (json!(true), true),
        (json!(false), false),
        (json!(null), false),
    ];
    for (raw, expected) in cases {
        let cfg: BotConfig = serde_json::from_value(config_json(raw.clone())).unwrap();
        assert_eq!(cfg.enabled, expected, "botStatus {raw}");
    }
}

#[test]
fn bot_config_serializes_status_as_integer() {
    let cfg: BotConfig = serde_json::from_value(config_json(json!(true))).unwrap();
    let value = serde_json::to_value(&cfg).unwrap();
    assert_eq!(value["botStatus"], json!(1));
    assert_eq!(value["position"], json!("bottom-right"));
}

#[test]
fn bot_config_quick_replies_drop_blank_entries() {
    let cfg: BotConfig = serde_json::from_value(config_json(json!(1))).unwrap();
    let buttons = cfg.quick_replies();
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].text, "Help");
    assert_eq!(buttons[0].prompt, "I want your help !!");
}

#[test]
fn bot_config_quick_replies_capped() {
    let mut cfg: BotConfig = serde_json::from_value(config_json(json!(1))).unwrap();
    cfg.quick_replies = (0..8)
        .map(|i| QuickReply { text: format!("b{i}"), prompt: format!("p{i}") })
        .collect();
    assert_eq!(cfg.quick_replies().len(), MAX_QUICK_REPLIES);
}

#[test]
fn bot_config_font_size_bounds() {
    let mut cfg: BotConfig = serde_json::from_value(config_json(json!(1))).unwrap();
    assert_eq!(cfg.font_size_px(), Some(16));
    cfg.font_size = "8".into();
    assert_eq!(cfg.font_size_px(), None);
    cfg.font_size = "30".into();
    assert_eq!(cfg.font_size_px(), None);
    cfg.font_size = "big".into();
    assert_eq!(cfg.font_size_px(), None);
}

#[test]
fn widget_position_parse() {
    assert_eq!(WidgetPosition::parse("bottom-left"), Some(WidgetPosition::BottomLeft));
    assert_eq!(WidgetPosition::parse(" bottom-right "), Some(WidgetPosition::BottomRight));
    assert_eq!(WidgetPosition::parse("top"), None);
}

// =============================================================================
// LeadEnvelope
// =============================================================================

#[test]
fn lead_envelope_error_message_only_on_failure() {
    let ok = LeadEnvelope::created(42);
    assert_eq!(ok.error_message(), None);
    assert_eq!(ok.data.post_id, Some(42));

    let err = LeadEnvelope::error("Invalid email format.");
    assert_eq!(err.error_message(), Some("Invalid email format."));
}

#[test]
fn lead_envelope_tolerates_missing_data() {
    let env: LeadEnvelope = serde_json::from_value(json!({ "success": false })).unwrap();
    assert_eq!(env.error_message(), None);
}
