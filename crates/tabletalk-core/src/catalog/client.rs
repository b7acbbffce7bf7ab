//! Catalog client trait definition.
//!
//! The concrete HTTP client lives in tabletalk-infra; core only sees
//! response bodies. The catalog's API answers with HTTP 202 while it
//! prepares an expensive result, which surfaces here as `Queued` so the
//! lookup service owns the retry policy.

use tabletalk_types::error::CatalogError;

/// One catalog response: a page of XML, or "not ready yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPage {
    /// Response body as returned by the catalog.
    Xml(String),
    /// The catalog accepted the request but is still assembling the
    /// result. Retry the same request after a delay.
    Queued,
}

/// Trait for the game catalog transport.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait CatalogClient: Send + Sync {
    /// Search the catalog for games matching `query`.
    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<CatalogPage, CatalogError>> + Send;

    /// Fetch the full details page (including stats) for one game id.
    fn details(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<CatalogPage, CatalogError>> + Send;
}
