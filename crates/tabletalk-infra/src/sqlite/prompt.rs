//! SQLite prompt history implementation.
//!
//! Implements `PromptStore` from `tabletalk-core`. Append-only log of
//! prompt deliveries; rotation reads back the latest delivery per prompt.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tabletalk_core::repository::prompt::PromptStore;
use tabletalk_types::error::RepositoryError;
use tabletalk_types::prompt::PromptDelivery;

use super::pool::DatabasePool;
use super::{decode_timestamp, encode_timestamp};

/// SQLite-backed implementation of `PromptStore`.
pub struct SqlitePromptStore {
    pool: DatabasePool,
}

impl SqlitePromptStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl PromptStore for SqlitePromptStore {
    async fn record_delivery(&self, delivery: &PromptDelivery) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO prompt_history (chat_id, prompt_id, sent_at) VALUES (?, ?, ?)")
            .bind(delivery.chat_id)
            .bind(&delivery.prompt_id)
            .bind(encode_timestamp(&delivery.sent_at))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn last_sent(
        &self,
        chat_id: i64,
    ) -> Result<Vec<(String, DateTime<Utc>)>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT prompt_id, MAX(sent_at) AS sent_at
               FROM prompt_history
               WHERE chat_id = ?
               GROUP BY prompt_id"#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut deliveries = Vec::with_capacity(rows.len());
        for row in &rows {
            let prompt_id: String = row
                .try_get("prompt_id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let sent_at: String = row
                .try_get("sent_at")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            deliveries.push((prompt_id, decode_timestamp(&sent_at)?));
        }
        Ok(deliveries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
