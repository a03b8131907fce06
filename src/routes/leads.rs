//! Lead capture route.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use wire::{CreateLeadRequest, LeadEnvelope};

use crate::services::leads::{self, LeadError};
use crate::state::AppState;

/// `POST /api/leads`: create the lead for a widget session.
///
/// Every outcome is a [`LeadEnvelope`]; failures carry `data.message`.
pub async fn create_lead(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<CreateLeadRequest>, JsonRejection>,
) -> (StatusCode, Json<LeadEnvelope>) {
    let Ok(Json(req)) = payload else {
        return (StatusCode::BAD_REQUEST, Json(LeadEnvelope::error("Invalid input data.")));
    };

    match leads::create_lead(state.leads.as_ref(), &state.geo, &headers, Some(peer), &req).await {
        Ok(id) => (StatusCode::OK, Json(LeadEnvelope::created(id))),
        Err(err) => {
            let status = lead_error_to_status(&err);
            let message = match &err {
                LeadError::Validation(msg) => (*msg).to_string(),
                LeadError::Duplicate => "An entry already exists for this conversation.".to_string(),
                LeadError::Store(_) => "Failed to save entry.".to_string(),
            };
            (status, Json(LeadEnvelope::error(message)))
        }
    }
}

pub(crate) fn lead_error_to_status(err: &LeadError) -> StatusCode {
    match err {
        LeadError::Validation(_) => StatusCode::BAD_REQUEST,
        LeadError::Duplicate => StatusCode::CONFLICT,
        LeadError::Store(e) => {
            tracing::error!(error = %e, "lead store failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "leads_test.rs"]
mod tests;
