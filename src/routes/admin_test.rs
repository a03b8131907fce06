use super::*;
use axum::http::Request;

use crate::state::AdminToken;
use crate::state::test_helpers::{self, TEST_ADMIN_TOKEN, TEST_SESSION};

fn admin_state() -> AppState {
    test_helpers::test_app_state().with_admin_token(AdminToken::new(TEST_ADMIN_TOKEN))
}

async fn extract(state: &AppState, auth: Option<&str>) -> Result<AdminAuth, StatusCode> {
    let mut builder = Request::builder().uri("/api/admin/settings");
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }
    let (mut parts, ()) = builder.body(()).unwrap().into_parts();
    AdminAuth::from_request_parts(&mut parts, state).await
}

// =========================================================================
// AdminAuth
// =========================================================================

#[tokio::test]
async fn auth_accepts_matching_bearer() {
    let state = admin_state();
    assert!(extract(&state, Some(&format!("Bearer {TEST_ADMIN_TOKEN}"))).await.is_ok());
}

#[tokio::test]
async fn auth_rejects_missing_or_wrong_token() {
    let state = admin_state();
    assert_eq!(extract(&state, None).await.err(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(extract(&state, Some("Bearer nope")).await.err(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(extract(&state, Some(TEST_ADMIN_TOKEN)).await.err(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn auth_hides_admin_api_without_token() {
    let state = test_helpers::test_app_state();
    let header = format!("Bearer {TEST_ADMIN_TOKEN}");
    assert_eq!(extract(&state, Some(&header)).await.err(), Some(StatusCode::NOT_FOUND));
}

// =========================================================================
// Settings
// =========================================================================

#[tokio::test]
async fn settings_round_trip_masks_key() {
    let state = admin_state();
    let body = HashMap::from([
        ("gemini_api_key".to_string(), "AIzaSyExampleKey1234".to_string()),
        ("header_title".to_string(), "Teapot Help".to_string()),
    ]);
    let Json(view) = put_settings(State(state.clone()), AdminAuth, Json(body)).await.unwrap();
    assert_eq!(view["header_title"], "Teapot Help");
    assert!(view["gemini_api_key"].ends_with("1234"));
    assert!(!view["gemini_api_key"].contains("AIza"));

    let Json(again) = get_settings(State(state), AdminAuth).await.unwrap();
    assert_eq!(again, view);
}

#[tokio::test]
async fn settings_rejects_unknown_key() {
    let state = admin_state();
    let body = HashMap::from([("favourite_colour".to_string(), "blue".to_string())]);
    let (status, Json(err)) = put_settings(State(state), AdminAuth, Json(body)).await.unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("favourite_colour"));
}

// =========================================================================
// Leads
// =========================================================================

#[tokio::test]
async fn list_get_delete_lead() {
    let state = admin_state();
    let id = test_helpers::seed_lead(&state, TEST_SESSION).await;

    let params = ListParams { page: None, per_page: None };
    let Json(rows) = list_leads(State(state.clone()), AdminAuth, Query(params)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);

    let Json(lead) = get_lead(State(state.clone()), AdminAuth, Path(id)).await.unwrap();
    assert_eq!(lead.name, "Alice");

    assert_eq!(delete_lead(State(state.clone()), AdminAuth, Path(id)).await, StatusCode::NO_CONTENT);
    assert_eq!(delete_lead(State(state.clone()), AdminAuth, Path(id)).await, StatusCode::NOT_FOUND);
    assert_eq!(get_lead(State(state), AdminAuth, Path(id)).await.err(), Some(StatusCode::NOT_FOUND));
}
