//! Postgres-backed store. Schema lives in `src/db/migrations`.

use std::collections::HashMap;

use sqlx::PgPool;
use sqlx::types::Json;
use wire::Turn;

use super::{Lead, LeadStore, LeadSummary, NewLead, SettingsStore, StoreError, now_ms};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type LeadRow = (i64, String, String, String, String, String, String, String, Json<Vec<Turn>>, i64, i64);

const LEAD_COLUMNS: &str =
    "id, session_id, name, email, phone, query, page_url, country, transcript, created_at, updated_at";

fn lead_from_row(row: LeadRow) -> Lead {
    let (id, session_id, name, email, phone, query, page_url, country, Json(transcript), created_at, updated_at) =
        row;
    Lead { id, session_id, name, email, phone, query, page_url, country, transcript, created_at, updated_at }
}

fn map_insert_error(err: sqlx::Error, session_id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(session_id.to_string()),
        _ => StoreError::Database(err),
    }
}

#[async_trait::async_trait]
impl LeadStore for PgStore {
    async fn create(&self, lead: NewLead) -> Result<i64, StoreError> {
        let now = now_ms();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO leads (session_id, name, email, phone, query, page_url, country, transcript, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, '[]'::jsonb, $8, $8)
             RETURNING id",
        )
        .bind(&lead.session_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.query)
        .bind(&lead.page_url)
        .bind(&lead.country)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &lead.session_id))?;

        Ok(id)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<Lead>, StoreError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE session_id = $1"))
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(lead_from_row))
    }

    async fn save_transcript(&self, session_id: &str, turns: &[Turn]) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE leads SET transcript = $2, updated_at = $3 WHERE session_id = $1")
            .bind(session_id)
            .bind(Json(turns))
            .bind(now_ms())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeadSummary>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, String, String, String, String, String, i64, i64)>(
            "SELECT id, session_id, name, email, phone, country,
                    jsonb_array_length(transcript)::BIGINT AS turns, created_at
             FROM leads
             ORDER BY id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, session_id, name, email, phone, country, turns, created_at)| LeadSummary {
                id,
                session_id,
                name,
                email,
                phone,
                country,
                turns,
                created_at,
            })
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Lead>, StoreError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(lead_from_row))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl SettingsStore for PgStore {
    async fn all(&self) -> Result<HashMap<String, String>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn put_many(&self, entries: &[(String, String)]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(
                "INSERT INTO settings (key, value) VALUES ($1, $2)
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "pg_test.rs"]
mod tests;
