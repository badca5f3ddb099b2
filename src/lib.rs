//! SVS Index
//!
//! Local, incrementally synced cache of the singing voice synthesizer catalog.
//! Shards of singer and software records are fetched from the hosting site
//! according to its manifest and kept in a SQLite cache.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod reader;
pub mod sqlite_persistence;
pub mod sync;

// Re-export commonly used types for convenience
pub use cache::{Partition, SqliteCache};
pub use catalog::{CatalogRecord, Category, Singer, Software};
pub use error::{CatalogError, CatalogResult, FetchError};
pub use fetch::{HttpShardFetcher, ShardFetcher};
pub use manifest::{Manifest, ManifestEntry};
pub use reader::{CatalogReader, CatalogSnapshot, CategoryLoad, LoadStatus};
pub use sync::{SyncEngine, SyncReport};
