//! Incremental synchronization of the local cache against the manifest.
//!
//! A category pass compares every manifest entry with the timestamp stored
//! for that shard, fetches only the shards whose manifest timestamp is
//! strictly newer, and commits the fetched records together with the new
//! timestamps. A shard that fails to fetch or parse is skipped and keeps its
//! old timestamp, so it is retried on the next pass.

mod report;

pub use report::{ShardFailure, SyncReport};

use crate::cache::{shard_meta_key, SqliteCache};
use crate::catalog::{CatalogRecord, Category, Singer, Software};
use crate::error::{CatalogResult, FetchError};
use crate::fetch::ShardFetcher;
use crate::manifest::{Manifest, ManifestEntry};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SyncEngine {
    manifest: Manifest,
    cache: Arc<SqliteCache>,
    fetcher: Arc<dyn ShardFetcher>,
}

impl SyncEngine {
    pub fn new(manifest: Manifest, cache: Arc<SqliteCache>, fetcher: Arc<dyn ShardFetcher>) -> Self {
        Self {
            manifest,
            cache,
            fetcher,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn cache(&self) -> &Arc<SqliteCache> {
        &self.cache
    }

    /// Brings the cached records of `category` up to date with the manifest.
    ///
    /// Fetch failures are reported per shard in the returned [`SyncReport`];
    /// only storage failures make this return an error.
    pub async fn ensure_category_updated(&self, category: Category) -> CatalogResult<SyncReport> {
        match category {
            Category::Singer => self.sync_records::<Singer>().await,
            Category::Software => self.sync_records::<Software>().await,
        }
    }

    async fn sync_records<R: CatalogRecord>(&self) -> CatalogResult<SyncReport> {
        let category = R::CATEGORY;
        let entries = self.manifest.entries(category);
        let mut report = SyncReport::new(category);

        let mut changed: Vec<&ManifestEntry> = Vec::new();
        for entry in entries {
            let stored = self
                .cache
                .get_meta(&shard_meta_key(category, &entry.file))
                .await?;
            if stored.map_or(true, |stored_ts| entry.ts > stored_ts) {
                changed.push(entry);
            }
        }
        report.unchanged = entries.len() - changed.len();

        if changed.is_empty() {
            debug!("All {} {} shards are up to date", entries.len(), category);
            return Ok(report);
        }

        info!(
            "Syncing {} of {} {} shards",
            changed.len(),
            entries.len(),
            category
        );

        let fetches = changed.into_iter().map(|entry| async move {
            let result = self.fetch_records::<R>(&entry.file).await;
            (entry, result)
        });

        let mut records: Vec<R> = Vec::new();
        let mut fetched: Vec<ManifestEntry> = Vec::new();
        for (entry, result) in join_all(fetches).await {
            match result {
                Ok(mut shard_records) => {
                    debug!(
                        "Fetched {} {} records from {}",
                        shard_records.len(),
                        category,
                        entry.file
                    );
                    records.append(&mut shard_records);
                    fetched.push(entry.clone());
                }
                Err(err) => {
                    warn!(
                        "Failed to fetch {} shard {}, will retry on next sync: {}",
                        category, entry.file, err
                    );
                    report.failed.push(ShardFailure {
                        file: entry.file.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if fetched.is_empty() {
            return Ok(report);
        }

        self.cache.commit_shards(&records, &fetched).await?;

        report.records_written = records.len();
        report.fetched = fetched.into_iter().map(|entry| entry.file).collect();
        info!("{}", report);
        Ok(report)
    }

    async fn fetch_records<R: CatalogRecord>(&self, file: &str) -> Result<Vec<R>, FetchError> {
        let body = self.fetcher.fetch_shard(R::CATEGORY, file).await?;
        let records = parse_shard::<R>(&body)?;

        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id()) {
                warn!(
                    "Duplicate {} id '{}' in shard {}",
                    R::CATEGORY,
                    record.id(),
                    file
                );
            }
        }
        Ok(records)
    }
}

/// Parses and validates a shard body. Any invalid record fails the whole shard.
pub fn parse_shard<R: CatalogRecord>(body: &str) -> Result<Vec<R>, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyPayload);
    }
    let records: Vec<R> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    for record in &records {
        record
            .validate()
            .map_err(|source| FetchError::InvalidRecord {
                id: record.id().to_string(),
                source,
            })?;
    }
    Ok(records)
}
