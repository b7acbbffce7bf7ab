//! SQLite connection pools for the bot archive.
//!
//! Writes in SQLite serialize on a single writer, so the pool is split:
//! `writer` holds exactly one connection for INSERT/UPDATE/DELETE, `reader`
//! holds several read-only connections so summaries, stats, and cache hits
//! never queue behind each other. WAL journal mode keeps readers from
//! blocking the writer. Migrations run on the writer before the reader pool
//! opens, so every handle sees the finished schema.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const READER_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Split read/write pool handle. Cheap to clone; clones share the pools.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only pool for SELECTs.
    pub reader: SqlitePool,
    /// Single-connection pool for mutations.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating the file if needed), migrate, and return the split pool.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = base_options(database_url)?;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        // Schema must exist before any reader connects.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

fn base_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        .create_if_missing(true))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::sqlite::open_temp_pool;

    #[tokio::test]
    async fn migrations_create_the_schema() {
        let (_dir, pool) = open_temp_pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(names, vec!["catalog_cache", "messages", "prompt_history"]);
    }

    #[tokio::test]
    async fn pool_pragmas_are_applied() {
        let (_dir, pool) = open_temp_pool().await;

        let journal: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(journal.0.to_lowercase(), "wal");

        let fk: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(fk.0, 1);
    }

    #[tokio::test]
    async fn reader_pool_rejects_writes() {
        let (_dir, pool) = open_temp_pool().await;

        let result = sqlx::query(
            "INSERT INTO prompt_history (chat_id, prompt_id, sent_at) \
             VALUES (1, 'x', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool.reader)
        .await;

        assert!(result.is_err(), "read-only pool accepted an INSERT");
    }
}
