//! Admin routes: settings and lead management behind a bearer token.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{FromRef, FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::Json;
use serde::Deserialize;

use crate::services::leads::{self as lead_svc, DEFAULT_PAGE_SIZE};
use crate::services::settings::{self, SettingsError};
use crate::state::AppState;
use crate::store::{Lead, LeadSummary};

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Proof that the request carried the admin bearer token.
/// 404 when no token is configured, 401 when it is missing or wrong.
pub struct AdminAuth;

impl<S> FromRequestParts<S> for AdminAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Some(expected) = &app_state.admin_token else {
            return Err(StatusCode::NOT_FOUND);
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default();
        if presented.is_empty() || !expected.matches(presented) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Self)
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// `GET /api/admin/settings`: every option, API key masked.
pub async fn get_settings(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<Json<BTreeMap<String, String>>, StatusCode> {
    let bot = settings::load(state.settings.as_ref())
        .await
        .map_err(super::chat::settings_error_to_status)?;
    Ok(Json(bot.masked()))
}

/// `PUT /api/admin/settings`: partial update; returns the new masked view.
pub async fn put_settings(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Json(body): Json<HashMap<String, String>>,
) -> Result<Json<BTreeMap<String, String>>, (StatusCode, Json<serde_json::Value>)> {
    settings::update(state.settings.as_ref(), body)
        .await
        .map_err(settings_error_to_response)?;
    let bot = settings::load(state.settings.as_ref())
        .await
        .map_err(settings_error_to_response)?;
    Ok(Json(bot.masked()))
}

fn settings_error_to_response(err: SettingsError) -> (StatusCode, Json<serde_json::Value>) {
    let message = err.to_string();
    let status = super::chat::settings_error_to_status(err);
    (status, Json(serde_json::json!({ "error": message })))
}

// =============================================================================
// LEADS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// `GET /api/admin/leads?page=&per_page=`: newest first.
pub async fn list_leads(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<LeadSummary>>, StatusCode> {
    let rows = lead_svc::list_leads(
        state.leads.as_ref(),
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await
    .map_err(|e| super::leads::lead_error_to_status(&e))?;
    Ok(Json(rows))
}

/// `GET /api/admin/leads/:id`: one lead with its transcript.
pub async fn get_lead(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
) -> Result<Json<Lead>, StatusCode> {
    let lead = state
        .leads
        .get(id)
        .await
        .map_err(|e| super::leads::lead_error_to_status(&e.into()))?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(lead))
}

/// `DELETE /api/admin/leads/:id`.
pub async fn delete_lead(State(state): State<AppState>, _auth: AdminAuth, Path(id): Path<i64>) -> StatusCode {
    match state.leads.delete(id).await {
        Ok(true) => {
            tracing::info!(lead_id = id, "lead deleted");
            StatusCode::NO_CONTENT
        }
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => super::leads::lead_error_to_status(&e.into()),
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
