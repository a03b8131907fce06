//! Lead service: capture and admin listing.
//!
//! DESIGN
//! ======
//! `create_lead` validates before any I/O, then resolves the visitor's
//! country, then inserts. Transcript saves come from the chat relay and are
//! best-effort: a missing lead or a store failure is logged, never surfaced
//! to the visitor.

use std::net::SocketAddr;
use std::sync::LazyLock;

use axum::http::HeaderMap;
use regex::Regex;
use wire::{CreateLeadRequest, EMAIL_PATTERN, Turn};

use super::geo::GeoLocator;
use crate::store::{LeadStore, LeadSummary, NewLead, StoreError};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const MISSING_FIELDS: &str = "Missing required fields (name, email, phone, lead_id).";
pub const INVALID_EMAIL: &str = "Invalid email format.";

#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("a lead already exists for this session")]
    Duplicate,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LeadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => Self::Duplicate,
            other => Self::Store(other),
        }
    }
}

// =============================================================================
// CAPTURE
// =============================================================================

/// Normalize and check a lead submission. Country is filled in later.
///
/// # Errors
///
/// [`LeadError::Validation`] with the visitor-facing message.
pub fn validate_lead(req: &CreateLeadRequest) -> Result<NewLead, LeadError> {
    let name = single_line(&req.name);
    let email = req.email.trim().to_string();
    let phone = single_line(&req.phone);
    let session_id = req.lead_id.trim().to_string();

    if name.is_empty() || email.is_empty() || phone.is_empty() || session_id.is_empty() {
        return Err(LeadError::Validation(MISSING_FIELDS));
    }
    if !is_valid_email(&email) {
        return Err(LeadError::Validation(INVALID_EMAIL));
    }

    Ok(NewLead {
        session_id,
        name,
        email,
        phone,
        query: req.query.trim().to_string(),
        page_url: sanitize_url(&req.current_page_url),
        country: String::new(),
    })
}

/// Validate, resolve country, insert. Returns the new lead id.
///
/// # Errors
///
/// Validation errors, [`LeadError::Duplicate`] for a reused session id, or a
/// store error.
pub async fn create_lead(
    store: &dyn LeadStore,
    geo: &GeoLocator,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    req: &CreateLeadRequest,
) -> Result<i64, LeadError> {
    let mut lead = validate_lead(req)?;
    lead.country = geo.country_for(headers, peer).await;

    let session_id = lead.session_id.clone();
    let id = store.create(lead).await?;
    tracing::info!(lead_id = id, %session_id, "lead captured");
    Ok(id)
}

/// Same pattern the widget checks before submitting.
static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN));

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    match &*EMAIL_RE {
        Ok(re) => re.is_match(email),
        Err(e) => {
            tracing::error!(error = %e, "email pattern failed to compile");
            false
        }
    }
}

fn single_line(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep http(s) URLs only.
fn sanitize_url(raw: &str) -> String {
    let url = raw.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        String::new()
    }
}

// =============================================================================
// TRANSCRIPTS
// =============================================================================

/// Replace the stored transcript for `session_id`; failures are logged only.
pub async fn record_transcript(store: &dyn LeadStore, session_id: &str, turns: &[Turn]) {
    match store.save_transcript(session_id, turns).await {
        Ok(true) => tracing::debug!(%session_id, turns = turns.len(), "transcript saved"),
        Ok(false) => tracing::warn!(%session_id, "no lead for session; transcript not saved"),
        Err(e) => tracing::error!(%session_id, error = %e, "transcript save failed"),
    }
}

// =============================================================================
// ADMIN
// =============================================================================

/// One page of leads, newest first. `page` is 1-based; sizes are clamped.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_leads(store: &dyn LeadStore, page: i64, per_page: i64) -> Result<Vec<LeadSummary>, LeadError> {
    let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
    let offset = (page.max(1) - 1).saturating_mul(per_page);
    Ok(store.list(per_page, offset).await?)
}

#[cfg(test)]
#[path = "leads_test.rs"]
mod tests;
