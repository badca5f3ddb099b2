//! Read API used by the presentation layer.
//!
//! Every read first lets the sync engine refresh the category, then serves
//! whatever is in the cache. Fetch failures never hide cached data, they only
//! downgrade the reported [`LoadStatus`].

use crate::catalog::{CatalogRecord, Category, Singer, Software};
use crate::error::{CatalogError, CatalogResult};
use crate::sync::{SyncEngine, SyncReport};
use tracing::{error, warn};

/// Freshness of the records returned by a load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// Every changed shard was synced.
    Fresh,
    /// Some shards could not be fetched, their records may be outdated.
    Partial { failed_shards: Vec<String> },
    /// The sync failed entirely, records come from the existing cache.
    Stale { reason: String },
}

#[derive(Clone, Debug)]
pub struct CategoryLoad<R> {
    pub records: Vec<R>,
    pub status: LoadStatus,
}

#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    pub singers: CategoryLoad<Singer>,
    pub softwares: CategoryLoad<Software>,
}

pub struct CatalogReader {
    engine: SyncEngine,
}

impl CatalogReader {
    pub fn new(engine: SyncEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    fn status_of(category: Category, sync: CatalogResult<SyncReport>) -> LoadStatus {
        match sync {
            Ok(report) if report.is_complete() => LoadStatus::Fresh,
            Ok(report) => LoadStatus::Partial {
                failed_shards: report.failed.into_iter().map(|f| f.file).collect(),
            },
            Err(err) => {
                error!("Failed to sync {} records: {}", category, err);
                LoadStatus::Stale {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Syncs the category and returns every cached record of it.
    ///
    /// Fails only if the cache itself cannot be read.
    pub async fn load_category<R: CatalogRecord>(&self) -> CatalogResult<CategoryLoad<R>> {
        let sync = self.engine.ensure_category_updated(R::CATEGORY).await;
        let status = Self::status_of(R::CATEGORY, sync);
        let records = self.engine.cache().get_all::<R>().await?;
        Ok(CategoryLoad { records, status })
    }

    /// Loads both categories, syncing them concurrently.
    pub async fn load_all(&self) -> CatalogResult<CatalogSnapshot> {
        let (singers, softwares) = tokio::join!(
            self.load_category::<Singer>(),
            self.load_category::<Software>()
        );
        Ok(CatalogSnapshot {
            singers: singers?,
            softwares: softwares?,
        })
    }

    /// Looks a record up in the cache, syncing its category once on a miss.
    pub async fn get_by_id<R: CatalogRecord>(&self, id: &str) -> CatalogResult<R> {
        let cache = self.engine.cache();
        if let Some(record) = cache.get_by_id::<R>(id).await? {
            return Ok(record);
        }

        let report = self.engine.ensure_category_updated(R::CATEGORY).await?;
        if !report.is_complete() {
            warn!(
                "Looking up {} '{}' after an incomplete sync: {}",
                R::CATEGORY,
                id,
                report
            );
        }

        cache
            .get_by_id::<R>(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                category: R::CATEGORY,
                id: id.to_string(),
            })
    }
}
