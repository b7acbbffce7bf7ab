//! Board-game catalog entry types for TableTalk.
//!
//! A `GameEntry` holds the normalized metadata the bot extracts from the
//! external game catalog. Entries are cached in SQLite, keyed by the
//! normalized query name, and refreshed after a TTL.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A parsed and normalized catalog record for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    /// Normalized query key this entry is cached under.
    pub name_key: String,
    /// Identifier in the external catalog.
    pub external_id: i64,
    /// Primary name as reported by the catalog.
    pub name: String,
    /// Year of publication.
    pub year: Option<i32>,
    /// Box-art image URL.
    pub image_url: Option<String>,
    /// Minimum supported player count.
    pub min_players: Option<u32>,
    /// Maximum supported player count.
    pub max_players: Option<u32>,
    /// Community-voted best player counts, highest "Best" tally first,
    /// capped at 3. Values are kept verbatim ("4+", not just numerals).
    #[serde(default)]
    pub best_player_counts: Vec<String>,
    /// Typical play time in minutes.
    pub playtime_minutes: Option<u32>,
    /// Complexity weight on the catalog's 1-5 scale.
    pub weight: Option<f64>,
    /// Overall popularity rank. `None` when the catalog reports the game as
    /// unranked -- never a numeric placeholder.
    pub rank: Option<u32>,
    /// Canonical catalog page URL.
    pub url: String,
    /// Short description (already compressed or truncated at fetch time).
    pub summary: String,
    /// Up to 5 mechanics named by the catalog.
    #[serde(default)]
    pub mechanics: Vec<String>,
    /// When this entry was fetched from the catalog.
    pub fetched_at: DateTime<Utc>,
}

impl GameEntry {
    /// Whether the entry is still inside the cache TTL.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl_days: i64) -> bool {
        now - self.fetched_at < Duration::days(ttl_days)
    }
}

/// Normalize a user-supplied game name into a cache key: trimmed,
/// lowercased, inner whitespace collapsed to single spaces.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
