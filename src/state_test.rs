use super::*;

#[test]
fn admin_token_blank_is_disabled() {
    assert!(AdminToken::new("").is_none());
    assert!(AdminToken::new("   ").is_none());
}

#[test]
fn admin_token_matches_exact_value() {
    let token = AdminToken::new("s3cret").unwrap();
    assert!(token.matches("s3cret"));
    assert!(token.matches(" s3cret "));
    assert!(!token.matches("s3cre"));
    assert!(!token.matches("s3cret2"));
    assert!(!token.matches(""));
}

#[test]
fn fallback_api_key_blank_is_none() {
    let state = test_helpers::test_app_state().with_fallback_api_key(Some("  ".into()));
    assert!(state.fallback_api_key.is_none());

    let state = state.with_fallback_api_key(Some("env-key".into()));
    assert_eq!(state.fallback_api_key.as_deref(), Some("env-key"));
}

#[tokio::test]
async fn new_state_shares_one_store() {
    let state = test_helpers::test_app_state();
    state.settings.put_many(&[("header_title".into(), "Hi".into())]).await.unwrap();
    test_helpers::seed_lead(&state, test_helpers::TEST_SESSION).await;

    assert_eq!(state.settings.all().await.unwrap()["header_title"], "Hi");
    assert!(state.leads.find_by_session(test_helpers::TEST_SESSION).await.unwrap().is_some());
}
