//! SQLite catalog cache implementation.
//!
//! Implements `CatalogStore` from `tabletalk-core`. One row per normalized
//! game name; list-valued fields are stored as JSON text and deserialized
//! on read. Freshness is judged by the caller, so a stale row is still
//! returned as-is.

use sqlx::Row;
use tabletalk_core::repository::catalog::CatalogStore;
use tabletalk_types::catalog::GameEntry;
use tabletalk_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{decode_timestamp, encode_timestamp};

/// SQLite-backed implementation of `CatalogStore`.
pub struct SqliteCatalogStore {
    pool: DatabasePool,
}

impl SqliteCatalogStore {
    /// Create a new cache backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct CatalogRow {
    name_key: String,
    external_id: i64,
    name: String,
    year: Option<i32>,
    image_url: Option<String>,
    min_players: Option<i64>,
    max_players: Option<i64>,
    best_player_counts: String,
    playtime_minutes: Option<i64>,
    weight: Option<f64>,
    rank: Option<i64>,
    url: String,
    summary: String,
    mechanics: String,
    fetched_at: String,
}

impl CatalogRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            name_key: row.try_get("name_key")?,
            external_id: row.try_get("external_id")?,
            name: row.try_get("name")?,
            year: row.try_get("year")?,
            image_url: row.try_get("image_url")?,
            min_players: row.try_get("min_players")?,
            max_players: row.try_get("max_players")?,
            best_player_counts: row.try_get("best_player_counts")?,
            playtime_minutes: row.try_get("playtime_minutes")?,
            weight: row.try_get("weight")?,
            rank: row.try_get("rank")?,
            url: row.try_get("url")?,
            summary: row.try_get("summary")?,
            mechanics: row.try_get("mechanics")?,
            fetched_at: row.try_get("fetched_at")?,
        })
    }

    fn into_entry(self) -> Result<GameEntry, RepositoryError> {
        let best_player_counts: Vec<String> = serde_json::from_str(&self.best_player_counts)
            .map_err(|e| RepositoryError::Query(format!("invalid best_player_counts JSON: {e}")))?;
        let mechanics: Vec<String> = serde_json::from_str(&self.mechanics)
            .map_err(|e| RepositoryError::Query(format!("invalid mechanics JSON: {e}")))?;

        Ok(GameEntry {
            name_key: self.name_key,
            external_id: self.external_id,
            name: self.name,
            year: self.year,
            image_url: self.image_url,
            min_players: self.min_players.map(|v| v as u32),
            max_players: self.max_players.map(|v| v as u32),
            best_player_counts,
            playtime_minutes: self.playtime_minutes.map(|v| v as u32),
            weight: self.weight,
            rank: self.rank.map(|v| v as u32),
            url: self.url,
            summary: self.summary,
            mechanics,
            fetched_at: decode_timestamp(&self.fetched_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_json(values: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(values)
        .map_err(|e| RepositoryError::Query(format!("serialize list: {e}")))
}

// ---------------------------------------------------------------------------
// CatalogStore impl
// ---------------------------------------------------------------------------

impl CatalogStore for SqliteCatalogStore {
    async fn get(&self, name_key: &str) -> Result<Option<GameEntry>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM catalog_cache WHERE name_key = ?")
            .bind(name_key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r = CatalogRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_entry()?))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, entry: &GameEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO catalog_cache
               (name_key, external_id, name, year, image_url, min_players, max_players,
                best_player_counts, playtime_minutes, weight, rank, url, summary,
                mechanics, fetched_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (name_key) DO UPDATE SET
                   external_id = excluded.external_id,
                   name = excluded.name,
                   year = excluded.year,
                   image_url = excluded.image_url,
                   min_players = excluded.min_players,
                   max_players = excluded.max_players,
                   best_player_counts = excluded.best_player_counts,
                   playtime_minutes = excluded.playtime_minutes,
                   weight = excluded.weight,
                   rank = excluded.rank,
                   url = excluded.url,
                   summary = excluded.summary,
                   mechanics = excluded.mechanics,
                   fetched_at = excluded.fetched_at"#,
        )
        .bind(&entry.name_key)
        .bind(entry.external_id)
        .bind(&entry.name)
        .bind(entry.year)
        .bind(&entry.image_url)
        .bind(entry.min_players.map(i64::from))
        .bind(entry.max_players.map(i64::from))
        .bind(to_json(&entry.best_player_counts)?)
        .bind(entry.playtime_minutes.map(i64::from))
        .bind(entry.weight)
        .bind(entry.rank.map(i64::from))
        .bind(&entry.url)
        .bind(&entry.summary)
        .bind(to_json(&entry.mechanics)?)
        .bind(encode_timestamp(&entry.fetched_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::open_temp_pool;
    use chrono::{TimeZone, Utc};

    fn make_entry(name_key: &str) -> GameEntry {
        GameEntry {
            name_key: name_key.to_string(),
            external_id: 224517,
            name: "Brass: Birmingham".to_string(),
            year: Some(2018),
            image_url: Some("https://example.org/brass.jpg".to_string()),
            min_players: Some(2),
            max_players: Some(4),
            best_player_counts: vec!["3".to_string(), "4".to_string()],
            playtime_minutes: Some(120),
            weight: Some(3.87),
            rank: Some(1),
            url: "https://boardgamegeek.com/boardgame/224517".to_string(),
            summary: "Build canals and railways in the Midlands.".to_string(),
            mechanics: vec!["Network Building".to_string(), "Hand Management".to_string()],
            fetched_at: Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get_round_trip() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteCatalogStore::new(pool);

        let entry = make_entry("brass birmingham");
        store.put(&entry).await.unwrap();

        let found = store.get("brass birmingham").await.unwrap().unwrap();
        assert_eq!(found, entry);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteCatalogStore::new(pool);

        assert!(store.get("azul").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteCatalogStore::new(pool);

        store.put(&make_entry("brass")).await.unwrap();

        let mut refreshed = make_entry("brass");
        refreshed.rank = Some(2);
        refreshed.fetched_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        store.put(&refreshed).await.unwrap();

        let found = store.get("brass").await.unwrap().unwrap();
        assert_eq!(found.rank, Some(2));
        assert_eq!(found.fetched_at, refreshed.fetched_at);
    }

    #[tokio::test]
    async fn test_optional_fields_survive_as_none() {
        let (_dir, pool) = open_temp_pool().await;
        let store = SqliteCatalogStore::new(pool);

        let entry = GameEntry {
            year: None,
            image_url: None,
            min_players: None,
            max_players: None,
            best_player_counts: Vec::new(),
            playtime_minutes: None,
            weight: None,
            rank: None,
            mechanics: Vec::new(),
            ..make_entry("mystery game")
        };
        store.put(&entry).await.unwrap();

        let found = store.get("mystery game").await.unwrap().unwrap();
        assert!(found.rank.is_none());
        assert!(found.weight.is_none());
        assert!(found.best_player_counts.is_empty());
        assert!(found.mechanics.is_empty());
    }
}
