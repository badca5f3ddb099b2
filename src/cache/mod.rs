//! Local persistent cache of catalog records and sync metadata.

mod schema;
mod sqlite_cache;

pub use schema::CACHE_VERSIONED_SCHEMAS;
pub use sqlite_cache::SqliteCache;

use crate::catalog::Category;

/// The three independent namespaces of the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Singers,
    Softwares,
    SyncMeta,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Singers, Partition::Softwares, Partition::SyncMeta];

    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Singer => Partition::Singers,
            Category::Software => Partition::Softwares,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Partition::Singers => "singers",
            Partition::Softwares => "softwares",
            Partition::SyncMeta => "sync_meta",
        }
    }
}

/// Sync metadata key of a shard, e.g. `singer:file:h.json`.
pub fn shard_meta_key(category: Category, file: &str) -> String {
    format!("{}:file:{}", category.as_str(), file)
}
