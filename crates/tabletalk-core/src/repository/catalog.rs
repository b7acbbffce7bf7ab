//! Catalog cache trait definition.

use tabletalk_types::catalog::GameEntry;
use tabletalk_types::error::RepositoryError;

/// Repository trait for cached game catalog entries.
///
/// Entries are keyed by normalized game name. Freshness is the caller's
/// concern: `get` returns whatever is stored, stale or not, and the
/// lookup service decides whether to use it.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait CatalogStore: Send + Sync {
    /// Fetch a cached entry by its normalized name key.
    fn get(
        &self,
        name_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<GameEntry>, RepositoryError>> + Send;

    /// Insert or replace the cached entry for `entry.name_key`.
    fn put(
        &self,
        entry: &GameEntry,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
