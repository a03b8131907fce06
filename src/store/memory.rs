//! In-process store used without `DATABASE_URL` and in tests.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;
use wire::Turn;

use super::{Lead, LeadStore, LeadSummary, NewLead, SettingsStore, StoreError, now_ms};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Keyed by id; ids are assigned in insertion order.
    leads: BTreeMap<i64, Lead>,
    next_id: i64,
    settings: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LeadStore for MemoryStore {
    async fn create(&self, lead: NewLead) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.leads.values().any(|l| l.session_id == lead.session_id) {
            return Err(StoreError::Duplicate(lead.session_id));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = now_ms();
        inner.leads.insert(
            id,
            Lead {
                id,
                session_id: lead.session_id,
                name: lead.name,
                email: lead.email,
                phone: lead.phone,
                query: lead.query,
                page_url: lead.page_url,
                country: lead.country,
                transcript: Vec::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Lead>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.leads.values().find(|l| l.session_id == session_id).cloned())
    }

    async fn save_transcript(&self, session_id: &str, turns: &[Turn]) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(lead) = inner.leads.values_mut().find(|l| l.session_id == session_id) else {
            return Ok(false);
        };
        lead.transcript = turns.to_vec();
        lead.updated_at = now_ms();
        Ok(true)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeadSummary>, StoreError> {
        let inner = self.inner.read().await;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(inner
            .leads
            .values()
            .rev()
            .skip(skip)
            .take(take)
            .map(LeadSummary::from)
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Lead>, StoreError> {
        Ok(self.inner.read().await.leads.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.leads.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemoryStore {
    async fn all(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn put_many(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for (key, value) in entries {
            inner.settings.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
