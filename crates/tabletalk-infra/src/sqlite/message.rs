//! SQLite message archive implementation.
//!
//! Implements `MessageStore` from `tabletalk-core` using sqlx with split
//! read/write pools. One row per delivered platform message; the primary
//! key on (chat_id, message_id) makes recording idempotent.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tabletalk_core::repository::message::MessageStore;
use tabletalk_types::error::RepositoryError;
use tabletalk_types::message::{ChatStats, SenderActivity, StoredMessage};

use super::pool::DatabasePool;
use super::{decode_timestamp, encode_timestamp};

/// SQLite-backed implementation of `MessageStore`.
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct MessageRow {
    chat_id: i64,
    message_id: i64,
    sender_id: i64,
    username: Option<String>,
    first_name: String,
    text: String,
    timestamp: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            message_id: row.try_get("message_id")?,
            sender_id: row.try_get("sender_id")?,
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            text: row.try_get("text")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, RepositoryError> {
        Ok(StoredMessage {
            chat_id: self.chat_id,
            message_id: self.message_id,
            sender_id: self.sender_id,
            username: self.username,
            first_name: self.first_name,
            text: self.text,
            timestamp: decode_timestamp(&self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// MessageStore impl
// ---------------------------------------------------------------------------

impl MessageStore for SqliteMessageStore {
    async fn record(&self, message: &StoredMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT OR IGNORE INTO messages
               (chat_id, message_id, sender_id, username, first_name, text, timestamp)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.chat_id)
        .bind(message.message_id)
        .bind(message.sender_id)
        .bind(&message.username)
        .bind(&message.first_name)
        .bind(&message.text)
        .bind(encode_timestamp(&message.timestamp))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn messages_since(
        &self,
        chat_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM messages
               WHERE chat_id = ? AND timestamp >= ?
               ORDER BY timestamp ASC"#,
        )
        .bind(chat_id)
        .bind(encode_timestamp(&since))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let r =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(r.into_message()?);
        }
        Ok(messages)
    }

    async fn stats(&self, chat_id: i64, top_limit: u32) -> Result<ChatStats, RepositoryError> {
        let totals = sqlx::query("SELECT COUNT(*) AS total, MIN(timestamp) AS earliest FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let total: i64 = totals
            .try_get("total")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let earliest: Option<String> = totals
            .try_get("earliest")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let earliest = earliest.as_deref().map(decode_timestamp).transpose()?;

        let rows = sqlx::query(
            r#"SELECT sender_id, username, first_name, COUNT(*) AS message_count
               FROM messages
               WHERE chat_id = ?
               GROUP BY sender_id
               ORDER BY message_count DESC
               LIMIT ?"#,
        )
        .bind(chat_id)
        .bind(i64::from(top_limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut top_senders = Vec::with_capacity(rows.len());
        for row in &rows {
            let username: Option<String> = row
                .try_get("username")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let first_name: String = row
                .try_get("first_name")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let message_count: i64 = row
                .try_get("message_count")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            top_senders.push(SenderActivity {
                username,
                first_name,
                message_count: message_count as u64,
            });
        }

        Ok(ChatStats {
            total_messages: total as u64,
            earliest,
            top_senders,
        })
    }

    async fn chats(&self) -> Result<Vec<i64>, RepositoryError> {
        let rows = sqlx::query("SELECT DISTINCT chat_id FROM messages ORDER BY chat_id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("chat_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))
            })
            .collect()
    }

    async fn purge_all(&self, chat_id: i64) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn purge_range(
        &self,
        chat_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM messages WHERE chat_id = ? AND timestamp >= ? AND timestamp <= ?")
                .bind(chat_id)
                .bind(encode_timestamp(&from))
                .bind(encode_timestamp(&to))
                .execute(&self.pool.writer)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::open_temp_pool;
    use chrono::{Duration, TimeZone};

    fn make_message(chat_id: i64, message_id: i64, minutes_ago: i64) -> StoredMessage {
        StoredMessage {
            chat_id,
            message_id,
            sender_id: message_id % 2,
            username: Some(format!("user{}", message_id % 2)),
            first_name: format!("User{}", message_id % 2),
            text: format!("message {message_id}"),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    // -- Recording --

    #[tokio::test]
    async fn test_record_and_query_window() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        store.record(&make_message(-100, 1, 30)).await.unwrap();
        store.record(&make_message(-100, 2, 20)).await.unwrap();
        store.record(&make_message(-100, 3, 10)).await.unwrap();

        let since = Utc::now() - Duration::hours(1);
        let messages = store.messages_since(-100, since).await.unwrap();
        assert_eq!(messages.len(), 3);
        // Oldest first
        assert_eq!(messages[0].message_id, 1);
        assert_eq!(messages[2].message_id, 3);
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        let msg = make_message(-100, 7, 5);
        store.record(&msg).await.unwrap();
        store.record(&msg).await.unwrap();

        let since = Utc::now() - Duration::hours(1);
        let messages = store.messages_since(-100, since).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_window_excludes_older_messages() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        store.record(&make_message(-100, 1, 600)).await.unwrap();
        store.record(&make_message(-100, 2, 5)).await.unwrap();

        let since = Utc::now() - Duration::hours(1);
        let messages = store.messages_since(-100, since).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_id, 2);
    }

    #[tokio::test]
    async fn test_chats_are_isolated() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        store.record(&make_message(-100, 1, 5)).await.unwrap();
        store.record(&make_message(-200, 1, 5)).await.unwrap();

        let since = Utc::now() - Duration::hours(1);
        let messages = store.messages_since(-100, since).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].chat_id, -100);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        let original = StoredMessage {
            chat_id: -100,
            message_id: 42,
            sender_id: 9,
            username: None,
            first_name: "Iñaki".to_string(),
            text: "¡buenas! 🎲".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap(),
        };
        store.record(&original).await.unwrap();

        let since = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let messages = store.messages_since(-100, since).await.unwrap();
        assert_eq!(messages[0], original);
    }

    // -- Stats --

    #[tokio::test]
    async fn test_stats_counts_and_ranks_senders() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        // Sender 1 gets two messages, sender 0 gets one.
        store.record(&make_message(-100, 1, 30)).await.unwrap();
        store.record(&make_message(-100, 3, 20)).await.unwrap();
        store.record(&make_message(-100, 2, 10)).await.unwrap();

        let stats = store.stats(-100, 5).await.unwrap();
        assert_eq!(stats.total_messages, 3);
        assert!(stats.earliest.is_some());
        assert_eq!(stats.top_senders.len(), 2);
        assert_eq!(stats.top_senders[0].message_count, 2);
        assert_eq!(stats.top_senders[0].username.as_deref(), Some("user1"));
    }

    #[tokio::test]
    async fn test_stats_respects_top_limit() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        for i in 0..4 {
            let mut msg = make_message(-100, i, 10);
            msg.sender_id = i;
            store.record(&msg).await.unwrap();
        }

        let stats = store.stats(-100, 2).await.unwrap();
        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.top_senders.len(), 2);
    }

    #[tokio::test]
    async fn test_chats_lists_distinct_ids_sorted() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        store.record(&make_message(-200, 1, 10)).await.unwrap();
        store.record(&make_message(-100, 1, 10)).await.unwrap();
        store.record(&make_message(-100, 2, 5)).await.unwrap();

        let chats = store.chats().await.unwrap();
        assert_eq!(chats, vec![-200, -100]);
    }

    #[tokio::test]
    async fn test_chats_empty_store() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        assert!(store.chats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_on_empty_chat() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        let stats = store.stats(-999, 5).await.unwrap();
        assert_eq!(stats.total_messages, 0);
        assert!(stats.earliest.is_none());
        assert!(stats.top_senders.is_empty());
    }

    // -- Purges --

    #[tokio::test]
    async fn test_purge_all_clears_only_one_chat() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        store.record(&make_message(-100, 1, 10)).await.unwrap();
        store.record(&make_message(-100, 2, 5)).await.unwrap();
        store.record(&make_message(-200, 1, 5)).await.unwrap();

        let deleted = store.purge_all(-100).await.unwrap();
        assert_eq!(deleted, 2);

        let since = Utc::now() - Duration::hours(1);
        assert!(store.messages_since(-100, since).await.unwrap().is_empty());
        assert_eq!(store.messages_since(-200, since).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_range_bounds_are_inclusive() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        let days = [10, 14, 15, 16, 20];
        for (i, day) in days.into_iter().enumerate() {
            let mut msg = make_message(-100, i as i64, 0);
            msg.timestamp = Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap();
            store.record(&msg).await.unwrap();
        }

        let from = Utc.with_ymd_and_hms(2026, 1, 14, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 1, 16, 23, 59, 59).unwrap();
        let deleted = store.purge_range(-100, from, to).await.unwrap();
        assert_eq!(deleted, 3);

        let since = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let remaining = store.messages_since(-100, since).await.unwrap();
        assert_eq!(remaining.len(), 2);
    }

    #[tokio::test]
    async fn test_purge_range_no_matches() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteMessageStore::new(pool);

        store.record(&make_message(-100, 1, 10)).await.unwrap();

        let from = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        let deleted = store.purge_range(-100, from, to).await.unwrap();
        assert_eq!(deleted, 0);
    }
}
