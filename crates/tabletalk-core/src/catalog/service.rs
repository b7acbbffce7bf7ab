//! Catalog lookup orchestration.
//!
//! The pipeline for `/game`: normalize the query, try the cache, search
//! the catalog, fetch details (retrying while the catalog reports the
//! result as still queued), compress long descriptions through the LLM,
//! and cache what came back.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabletalk_types::catalog::{normalize_name, GameEntry};
use tabletalk_types::config::{CatalogConfig, LlmConfig};
use tabletalk_types::error::CatalogError;
use tabletalk_types::llm::CompletionRequest;

use crate::catalog::client::{CatalogClient, CatalogPage};
use crate::catalog::parse;
use crate::llm::LlmProvider;
use crate::repository::catalog::CatalogStore;

/// Descriptions at or under this many characters (after cleanup) are
/// kept as-is.
pub const LONG_DESCRIPTION_CHARS: usize = 200;

/// Target length for compressed or truncated descriptions.
pub const SUMMARY_TARGET_CHARS: usize = 150;

const DESCRIPTION_MAX_TOKENS: u32 = 100;
const DESCRIPTION_TEMPERATURE: f64 = 0.3;
const DESCRIPTION_SYSTEM_PROMPT: &str =
    "You condense board-game descriptions. Reply with the condensed description only, no preamble.";

/// Base for the canonical game page link shown in replies.
const GAME_PAGE_BASE_URL: &str = "https://boardgamegeek.com/boardgame";

/// Looks up games in the external catalog, with caching.
pub struct CatalogService<K, S, P> {
    client: Arc<K>,
    store: Arc<S>,
    llm: Arc<P>,
    model: String,
    cache_ttl_days: i64,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl<K, S, P> CatalogService<K, S, P>
where
    K: CatalogClient,
    S: CatalogStore,
    P: LlmProvider,
{
    pub fn new(
        client: Arc<K>,
        store: Arc<S>,
        llm: Arc<P>,
        catalog: &CatalogConfig,
        llm_config: &LlmConfig,
    ) -> Self {
        Self {
            client,
            store,
            llm,
            model: llm_config.model.clone(),
            cache_ttl_days: catalog.cache_ttl_days,
            retry_attempts: catalog.retry_attempts,
            retry_delay: Duration::from_secs(catalog.retry_delay_secs),
        }
    }

    /// Resolve a user-typed game name to a catalog entry.
    ///
    /// `Ok(None)` covers every "no result" case: no search hit, a details
    /// page without an item, and a catalog that never finished preparing
    /// the result. Transport and credential failures bubble up as typed
    /// errors for the caller to log.
    #[tracing::instrument(name = "catalog.lookup", skip(self), fields(query = raw_name))]
    pub async fn lookup(&self, raw_name: &str) -> Result<Option<GameEntry>, CatalogError> {
        let key = normalize_name(raw_name);
        if key.is_empty() {
            return Ok(None);
        }
        let now = Utc::now();

        match self.store.get(&key).await {
            Ok(Some(entry)) if entry.is_fresh(now, self.cache_ttl_days) => {
                tracing::debug!(game = %entry.name, "cache hit");
                return Ok(Some(entry));
            }
            Ok(Some(entry)) => {
                tracing::debug!(game = %entry.name, "cache entry expired");
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "cache read failed, querying catalog directly");
            }
        }

        let Some(id) = self.search_first(&key).await? else {
            tracing::debug!("no catalog match");
            return Ok(None);
        };

        let body = match self.details_with_retry(id).await {
            Ok(body) => body,
            Err(error @ CatalogError::Busy { .. }) => {
                tracing::warn!(id, %error, "catalog lookup abandoned");
                return Ok(None);
            }
            Err(error) => return Err(error),
        };
        let Some(game) = parse::parse_details(&body)? else {
            tracing::warn!(id, "details response carried no item");
            return Ok(None);
        };

        let summary = self.condense_description(&game.description).await;
        let entry = GameEntry {
            name_key: key,
            external_id: id,
            name: game.name,
            year: game.year,
            image_url: game.image_url,
            min_players: game.min_players,
            max_players: game.max_players,
            best_player_counts: game.best_player_counts,
            playtime_minutes: game.playtime_minutes,
            weight: game.weight,
            rank: game.rank,
            url: format!("{GAME_PAGE_BASE_URL}/{id}"),
            summary,
            mechanics: game.mechanics,
            fetched_at: now,
        };

        if let Err(error) = self.store.put(&entry).await {
            tracing::warn!(%error, "cache write failed");
        }
        Ok(Some(entry))
    }

    async fn search_first(&self, query: &str) -> Result<Option<i64>, CatalogError> {
        match self.client.search(query).await? {
            CatalogPage::Xml(body) => parse::first_search_hit(&body),
            CatalogPage::Queued => {
                tracing::warn!("search queued by catalog, treating as no match");
                Ok(None)
            }
        }
    }

    /// Fetch details, retrying while the catalog answers "queued". Gives
    /// up after `retry_attempts` total attempts.
    async fn details_with_retry(&self, id: i64) -> Result<String, CatalogError> {
        for attempt in 1..=self.retry_attempts {
            match self.client.details(id).await? {
                CatalogPage::Xml(body) => return Ok(body),
                CatalogPage::Queued if attempt < self.retry_attempts => {
                    tracing::debug!(id, attempt, "details queued, waiting to retry");
                    tokio::time::sleep(self.retry_delay).await;
                }
                CatalogPage::Queued => {}
            }
        }
        Err(CatalogError::Busy {
            attempts: self.retry_attempts,
        })
    }

    /// Long descriptions get compressed by the model; if that fails they
    /// are hard-truncated instead. Short ones pass through untouched.
    async fn condense_description(&self, raw: &str) -> String {
        let cleaned = parse::clean_description(raw);
        if cleaned.chars().count() <= LONG_DESCRIPTION_CHARS {
            return cleaned;
        }

        let request = CompletionRequest::single_turn(
            &self.model,
            Some(DESCRIPTION_SYSTEM_PROMPT.to_string()),
            format!(
                "Condense this board-game description to roughly {SUMMARY_TARGET_CHARS} \
                 characters of plain prose, keeping what makes the game distinctive:\n\n{cleaned}"
            ),
            DESCRIPTION_MAX_TOKENS,
            Some(DESCRIPTION_TEMPERATURE),
        );

        match self.llm.complete(&request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => truncate_chars(&cleaned, SUMMARY_TARGET_CHARS),
            Err(error) => {
                tracing::warn!(%error, "description compression failed, truncating instead");
                truncate_chars(&cleaned, SUMMARY_TARGET_CHARS)
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
