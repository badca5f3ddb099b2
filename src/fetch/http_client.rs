//! HTTP shard fetcher.

use super::{shard_path, ShardFetcher, MANIFEST_PATH};
use crate::catalog::Category;
use crate::error::{CatalogError, CatalogResult, FetchError};
use crate::manifest::Manifest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Fetches shards over HTTP from `<base_url>/data/<category>/<file>`.
pub struct HttpShardFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpShardFetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    /// * `base_url` - Root of the hosting site (e.g., "https://svs.example.org")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: &str, timeout_sec: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, path: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Fetch the manifest from `<base_url>/data/manifest.json`.
    pub async fn fetch_manifest(&self) -> CatalogResult<Manifest> {
        let body = self
            .get_text(MANIFEST_PATH)
            .await
            .map_err(|e| CatalogError::MalformedManifest(format!("fetch failed: {}", e)))?;
        Manifest::parse(&body)
    }
}

#[async_trait]
impl ShardFetcher for HttpShardFetcher {
    async fn fetch_shard(&self, category: Category, file: &str) -> Result<String, FetchError> {
        self.get_text(&shard_path(category, file)).await
    }
}
