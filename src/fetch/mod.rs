//! Retrieval of shard payloads from the hosting site.

mod http_client;

pub use http_client::HttpShardFetcher;

use crate::catalog::Category;
use crate::error::FetchError;
use async_trait::async_trait;

/// Source of raw shard bodies.
///
/// Implementations return the response body untouched; parsing and validation
/// are left to the sync engine so every source fails the same way on bad data.
#[async_trait]
pub trait ShardFetcher: Send + Sync {
    async fn fetch_shard(&self, category: Category, file: &str) -> Result<String, FetchError>;
}

/// Path of a shard relative to the site root, e.g. `/data/singers/h.json`.
///
/// The file name is percent-encoded as a single path segment.
pub fn shard_path(category: Category, file: &str) -> String {
    format!(
        "/data/{}/{}",
        category.data_dir(),
        urlencoding::encode(file)
    )
}

pub const MANIFEST_PATH: &str = "/data/manifest.json";
