//! Persistence seams for leads and bot settings.
//!
//! DESIGN
//! ======
//! Two async traits, [`LeadStore`] and [`SettingsStore`], sit between the
//! services and storage. `PgStore` backs both with Postgres; `MemoryStore`
//! backs both with in-process maps and is used when no `DATABASE_URL` is
//! configured and throughout the test suite.
//!
//! Leads are keyed by a client-generated session id. The store enforces at
//! most one lead per session id and reports a second insert as
//! [`StoreError::Duplicate`].

pub mod memory;
pub mod pg;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use wire::Turn;

pub use memory::MemoryStore;
pub use pg::PgStore;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a lead already exists for session {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// RECORDS
// =============================================================================

/// Fields supplied when a visitor submits the lead form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub query: String,
    pub page_url: String,
    pub country: String,
}

/// A stored lead with its transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub query: String,
    pub page_url: String,
    pub country: String,
    pub transcript: Vec<Turn>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

/// List row for the admin leads table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSummary {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub turns: i64,
    pub created_at: i64,
}

impl From<&Lead> for LeadSummary {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            session_id: lead.session_id.clone(),
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            country: lead.country.clone(),
            turns: i64::try_from(lead.transcript.len()).unwrap_or(i64::MAX),
            created_at: lead.created_at,
        }
    }
}

// =============================================================================
// TRAITS
// =============================================================================

#[async_trait::async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert a lead and return its id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] if a lead already exists for the session id.
    async fn create(&self, lead: NewLead) -> Result<i64, StoreError>;

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Lead>, StoreError>;

    /// Replace the transcript of the lead owning `session_id`.
    /// Returns `false` when no such lead exists.
    async fn save_transcript(&self, session_id: &str, turns: &[Turn]) -> Result<bool, StoreError>;

    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeadSummary>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Lead>, StoreError>;

    /// Returns `false` when the id did not exist.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Every stored key/value pair. Keys that were never written are absent.
    async fn all(&self) -> Result<HashMap<String, String>, StoreError>;

    /// Upsert all entries atomically.
    async fn put_many(&self, entries: &[(String, String)]) -> Result<(), StoreError>;
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
