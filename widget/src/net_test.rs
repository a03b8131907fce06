use super::*;

#[test]
fn chat_success() {
    assert_eq!(interpret_chat(200, r#"{"success":true,"result":"Hello"}"#).unwrap(), "Hello");
}

#[test]
fn chat_503_keeps_server_result() {
    let body = r#"{"success":false,"result":"Chatbot configuration error. Please contact the site administrator.","message":"API key missing"}"#;
    let err = interpret_chat(503, body).unwrap_err();
    assert_eq!(err.chat_fallback(), "Chatbot configuration error. Please contact the site administrator.");
    assert!(matches!(err, WidgetError::Server { status: 503, .. }));
}

#[test]
fn chat_non_json_error_body() {
    let err = interpret_chat(502, "<html>Bad Gateway</html>").unwrap_err();
    assert_eq!(err, WidgetError::Server { status: 502, result: None, message: None });
}

#[test]
fn chat_success_false_on_200() {
    let err = interpret_chat(200, r#"{"success":false,"message":"nope"}"#).unwrap_err();
    assert_eq!(err, WidgetError::Rejected { result: None, message: Some("nope".into()) });
}

#[test]
fn chat_success_without_result() {
    let err = interpret_chat(200, r#"{"success":true}"#).unwrap_err();
    assert!(matches!(err, WidgetError::Rejected { result: None, message: None }));
}

#[test]
fn chat_unparseable_200() {
    assert!(matches!(interpret_chat(200, "{oops"), Err(WidgetError::Malformed(_))));
}

#[test]
fn config_parses_legacy_keys() {
    let body = r#"{"botStatus":1,"headerTitle":"Bot","StartUpMessage":"Hi","fontSize":"16",
        "userAvatarURL":"","botImageURL":"","commonButtons":[{"buttonText":"A","buttonPrompt":"a"}]}"#;
    let config = interpret_config(200, body).unwrap();
    assert!(config.enabled);
    assert_eq!(config.startup_message, "Hi");
    assert_eq!(config.quick_replies().len(), 1);
}

#[test]
fn config_errors() {
    assert!(matches!(interpret_config(500, "{}"), Err(WidgetError::Server { status: 500, .. })));
    assert!(matches!(interpret_config(200, "[]"), Err(WidgetError::Malformed(_))));
}

#[test]
fn lead_created() {
    let body = r#"{"success":true,"data":{"post_id":7,"message":"Entry saved successfully."}}"#;
    assert_eq!(interpret_lead(200, body).unwrap(), 7);
}

#[test]
fn lead_error_reads_data_message() {
    let body = r#"{"success":false,"data":{"message":"Invalid email format."}}"#;
    let err = interpret_lead(400, body).unwrap_err();
    assert_eq!(err.lead_alert(), "Error: Invalid email format.");
}

#[test]
fn lead_error_without_json() {
    assert!(matches!(interpret_lead(500, "Internal"), Err(WidgetError::Server { status: 500, .. })));
    assert!(matches!(interpret_lead(200, "nope"), Err(WidgetError::Malformed(_))));
    assert!(matches!(interpret_lead(200, r#"{"success":true,"data":{}}"#), Err(WidgetError::Malformed(_))));
}
