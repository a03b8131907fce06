use super::*;
use axum::extract::{ConnectInfo, State};

use crate::services::leads::{INVALID_EMAIL, MISSING_FIELDS};
use crate::state::test_helpers::{self, TEST_SESSION};

fn peer() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000)))
}

fn valid_request() -> CreateLeadRequest {
    CreateLeadRequest {
        name: "Alice".into(),
        email: "alice@example.com".into(),
        phone: "+15550100".into(),
        query: "pricing".into(),
        current_page_url: "https://shop.test/pricing".into(),
        lead_id: TEST_SESSION.into(),
    }
}

#[tokio::test]
async fn create_lead_returns_post_id() {
    let state = test_helpers::test_app_state();
    let (status, Json(envelope)) =
        create_lead(State(state.clone()), peer(), HeaderMap::new(), Ok(Json(valid_request()))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(envelope.success);
    let id = envelope.data.post_id.unwrap();
    let lead = state.leads.get(id).await.unwrap().unwrap();
    assert_eq!(lead.session_id, TEST_SESSION);
}

#[tokio::test]
async fn create_lead_rejects_missing_fields() {
    let state = test_helpers::test_app_state();
    let mut req = valid_request();
    req.phone = "  ".into();
    let (status, Json(envelope)) = create_lead(State(state), peer(), HeaderMap::new(), Ok(Json(req))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope.error_message(), Some(MISSING_FIELDS));
}

#[tokio::test]
async fn create_lead_rejects_bad_email() {
    let state = test_helpers::test_app_state();
    let mut req = valid_request();
    req.email = "not-an-email".into();
    let (status, Json(envelope)) = create_lead(State(state), peer(), HeaderMap::new(), Ok(Json(req))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope.error_message(), Some(INVALID_EMAIL));
}

#[tokio::test]
async fn create_lead_twice_conflicts() {
    let state = test_helpers::test_app_state();
    let _ = create_lead(State(state.clone()), peer(), HeaderMap::new(), Ok(Json(valid_request()))).await;
    let (status, Json(envelope)) =
        create_lead(State(state), peer(), HeaderMap::new(), Ok(Json(valid_request()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(!envelope.success);
    assert!(envelope.error_message().is_some());
}

#[test]
fn lead_error_to_status_maps_variants() {
    assert_eq!(lead_error_to_status(&LeadError::Validation(MISSING_FIELDS)), StatusCode::BAD_REQUEST);
    assert_eq!(lead_error_to_status(&LeadError::Duplicate), StatusCode::CONFLICT);
}
