//! HTTP client for the board-game catalog's XML API.
//!
//! Implements `CatalogClient` from `tabletalk-core` over reqwest. The
//! catalog answers 200 with an XML body, 202 when the result is still
//! being prepared server-side, and 401 when it dislikes our credentials.
//! Parsing the XML is the service layer's job; this client only moves
//! pages.

use std::time::Duration;

use tabletalk_core::catalog::client::{CatalogClient, CatalogPage};
use tabletalk_types::config::CatalogConfig;
use tabletalk_types::error::CatalogError;

/// reqwest-backed implementation of `CatalogClient`.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a client for the configured catalog API.
    pub fn new(config: &CatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<CatalogPage, CatalogError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| CatalogError::Http(format!("request failed: {e}")))?;

        match response.status().as_u16() {
            200 => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| CatalogError::Http(format!("reading body failed: {e}")))?;
                Ok(CatalogPage::Xml(body))
            }
            202 => Ok(CatalogPage::Queued),
            401 | 403 => Err(CatalogError::Auth),
            status => Err(CatalogError::Http(format!("HTTP {status} from {path}"))),
        }
    }
}

impl CatalogClient for HttpCatalogClient {
    async fn search(&self, query: &str) -> Result<CatalogPage, CatalogError> {
        self.fetch(
            "/search",
            &[
                ("query", query.to_string()),
                ("type", "boardgame".to_string()),
            ],
        )
        .await
    }

    async fn details(&self, id: i64) -> Result<CatalogPage, CatalogError> {
        self.fetch("/thing", &[("id", id.to_string()), ("stats", "1".to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let client = HttpCatalogClient::new(&CatalogConfig::default());
        assert_eq!(
            client.url("/search"),
            "https://boardgamegeek.com/xmlapi2/search"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = CatalogConfig {
            base_url: "http://localhost:9999/api/".to_string(),
            ..CatalogConfig::default()
        };
        let client = HttpCatalogClient::new(&config);
        assert_eq!(client.url("/thing"), "http://localhost:9999/api/thing");
    }
}
