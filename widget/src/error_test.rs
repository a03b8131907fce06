use super::*;

#[test]
fn network_failure_has_its_own_text() {
    assert_eq!(WidgetError::Network("dns".into()).chat_fallback(), NETWORK_FALLBACK);
}

#[test]
fn server_error_prefers_result_then_message() {
    let both = WidgetError::Server { status: 503, result: Some("Configured?".into()), message: Some("m".into()) };
    assert_eq!(both.chat_fallback(), "Configured?");

    let message_only = WidgetError::Server { status: 500, result: Some("  ".into()), message: Some("m".into()) };
    assert_eq!(message_only.chat_fallback(), "m");

    let neither = WidgetError::Server { status: 502, result: None, message: None };
    assert_eq!(neither.chat_fallback(), SERVER_FALLBACK);
}

#[test]
fn rejected_and_malformed_use_generation_fallback() {
    assert_eq!(WidgetError::Rejected { result: None, message: None }.chat_fallback(), GENERATION_FALLBACK);
    assert_eq!(WidgetError::Malformed("eof".into()).chat_fallback(), GENERATION_FALLBACK);
    let with_text = WidgetError::Rejected { result: None, message: Some("quota".into()) };
    assert_eq!(with_text.chat_fallback(), "quota");
}

#[test]
fn the_three_chat_fallbacks_differ() {
    assert_ne!(NETWORK_FALLBACK, SERVER_FALLBACK);
    assert_ne!(SERVER_FALLBACK, GENERATION_FALLBACK);
    assert_ne!(NETWORK_FALLBACK, GENERATION_FALLBACK);
}

#[test]
fn lead_alerts() {
    let dup = WidgetError::Rejected { result: None, message: Some("Already exists.".into()) };
    assert_eq!(dup.lead_alert(), "Error: Already exists.");
    assert_eq!(WidgetError::Network("x".into()).lead_alert(), LEAD_NETWORK_FALLBACK);
    assert_eq!(WidgetError::Malformed("x".into()).lead_alert(), format!("Error: {LEAD_SAVE_FALLBACK}"));
}
