use super::schema::CACHE_VERSIONED_SCHEMAS;
use super::{shard_meta_key, Partition};
use crate::catalog::{CatalogRecord, Category};
use crate::error::{CatalogError, CatalogResult};
use crate::manifest::ManifestEntry;
use crate::sqlite_persistence::initialize_schema;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
enum CacheLocation {
    File(PathBuf),
    InMemory,
}

/// Persistent record cache backed by a single SQLite connection.
///
/// The connection is opened lazily on the first operation and reused for the
/// lifetime of the cache. Every operation runs on the blocking thread pool so
/// callers only ever await.
pub struct SqliteCache {
    location: CacheLocation,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl SqliteCache {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            location: CacheLocation::File(db_path.as_ref().to_path_buf()),
            conn: OnceCell::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: CacheLocation::InMemory,
            conn: OnceCell::new(),
        }
    }

    fn open(location: &CacheLocation) -> CatalogResult<Connection> {
        let mut conn = match location {
            CacheLocation::File(path) => {
                info!("Opening catalog cache at {:?}", path);
                Connection::open(path)?
            }
            CacheLocation::InMemory => Connection::open_in_memory()?,
        };
        initialize_schema(&mut conn, CACHE_VERSIONED_SCHEMAS)
            .map_err(|e| CatalogError::StorageUnavailable(format!("{:#}", e)))?;
        Ok(conn)
    }

    async fn connection(&self) -> CatalogResult<Arc<Mutex<Connection>>> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let conn = tokio::task::spawn_blocking(move || Self::open(&location)).await??;
                Ok::<_, CatalogError>(Arc::new(Mutex::new(conn)))
            })
            .await?;
        Ok(conn.clone())
    }

    async fn with_conn<T, F>(&self, f: F) -> CatalogResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> CatalogResult<T> + Send + 'static,
    {
        let conn = self.connection().await?;
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                CatalogError::StorageUnavailable("cache connection is poisoned".to_string())
            })?;
            f(&mut *guard)
        })
        .await?
    }

    fn serialize_records<R: CatalogRecord>(records: &[R]) -> CatalogResult<Vec<(String, String)>> {
        records
            .iter()
            .map(|record| {
                serde_json::to_string(record)
                    .map(|body| (record.id().to_string(), body))
                    .map_err(|e| {
                        CatalogError::StorageUnavailable(format!(
                            "Failed to encode {} '{}': {}",
                            R::CATEGORY,
                            record.id(),
                            e
                        ))
                    })
            })
            .collect()
    }

    fn upsert_rows(conn: &Connection, table: &str, rows: &[(String, String)]) -> CatalogResult<()> {
        let mut stmt = conn.prepare(&format!(
            "INSERT OR REPLACE INTO {} (id, body) VALUES (?1, ?2)",
            table
        ))?;
        for (id, body) in rows {
            stmt.execute(params![id, body])?;
        }
        Ok(())
    }

    fn decode_row<R: CatalogRecord>(id: &str, body: &str) -> Option<R> {
        match serde_json::from_str(body) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable cached {} '{}': {}", R::CATEGORY, id, e);
                None
            }
        }
    }

    /// Upserts a single record, last write wins.
    pub async fn put<R: CatalogRecord>(&self, record: &R) -> CatalogResult<()> {
        self.put_many(std::slice::from_ref(record)).await
    }

    /// Upserts all records in one transaction, last write wins.
    pub async fn put_many<R: CatalogRecord>(&self, records: &[R]) -> CatalogResult<()> {
        let rows = Self::serialize_records(records)?;
        let table = Partition::for_category(R::CATEGORY).table();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            Self::upsert_rows(&tx, table, &rows)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Every cached record of the category, in no particular order.
    pub async fn get_all<R: CatalogRecord>(&self) -> CatalogResult<Vec<R>> {
        let table = Partition::for_category(R::CATEGORY).table();
        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&format!("SELECT id, body FROM {}", table))?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        Ok(rows
            .iter()
            .filter_map(|(id, body)| Self::decode_row(id, body))
            .collect())
    }

    pub async fn get_by_id<R: CatalogRecord>(&self, id: &str) -> CatalogResult<Option<R>> {
        let table = Partition::for_category(R::CATEGORY).table();
        let key = id.to_string();
        let body = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT body FROM {} WHERE id = ?1", table),
                        params![key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?)
            })
            .await?;

        Ok(body.and_then(|body| Self::decode_row(id, &body)))
    }

    pub async fn count(&self, category: Category) -> CatalogResult<usize> {
        let table = Partition::for_category(category).table();
        self.with_conn(move |conn| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(count as usize)
        })
        .await
    }

    /// Unix time in seconds of the most recent record write in the category.
    pub async fn last_updated(&self, category: Category) -> CatalogResult<Option<i64>> {
        let table = Partition::for_category(category).table();
        self.with_conn(move |conn| {
            Ok(conn.query_row(
                &format!("SELECT MAX(updated_at) FROM {}", table),
                [],
                |row| row.get::<_, Option<i64>>(0),
            )?)
        })
        .await
    }

    /// Removes every entry of a partition. Only used for full resets.
    pub async fn clear(&self, partition: Partition) -> CatalogResult<()> {
        let table = partition.table();
        let removed = self
            .with_conn(move |conn| Ok(conn.execute(&format!("DELETE FROM {}", table), [])?))
            .await?;
        debug!("Cleared {} entries from {}", removed, table);
        Ok(())
    }

    pub async fn set_meta(&self, key: &str, value: i64) -> CatalogResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_meta(&self, key: &str) -> CatalogResult<Option<i64>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM sync_meta WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })
        .await
    }

    /// Last synced timestamp of every shard of the category, ordered by file name.
    pub async fn shard_timestamps(&self, category: Category) -> CatalogResult<Vec<(String, i64)>> {
        let prefix = shard_meta_key(category, "");
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT substr(key, ?2), value FROM sync_meta
                 WHERE substr(key, 1, ?3) = ?1
                 ORDER BY key ASC",
            )?;
            let rows = stmt
                .query_map(
                    params![prefix, prefix.len() as i64 + 1, prefix.len() as i64],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Writes the records of one or more successfully fetched shards and
    /// advances their sync timestamps, all in a single transaction.
    ///
    /// If this fails nothing is advanced, so the shards are fetched again on
    /// the next sync.
    pub async fn commit_shards<R: CatalogRecord>(
        &self,
        records: &[R],
        shards: &[ManifestEntry],
    ) -> CatalogResult<()> {
        let rows = Self::serialize_records(records)?;
        let table = Partition::for_category(R::CATEGORY).table();
        let metas: Vec<(String, i64)> = shards
            .iter()
            .map(|shard| (shard_meta_key(R::CATEGORY, &shard.file), shard.ts))
            .collect();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            Self::upsert_rows(&tx, table, &rows)?;
            {
                let mut stmt =
                    tx.prepare("INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?1, ?2)")?;
                for (key, ts) in &metas {
                    stmt.execute(params![key, ts])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Closes the underlying connection, if it was ever opened.
    pub fn close(self) -> CatalogResult<()> {
        let Some(conn) = self.conn.into_inner() else {
            return Ok(());
        };
        let Ok(conn) = Arc::try_unwrap(conn) else {
            return Err(CatalogError::StorageUnavailable(
                "cache connection is still in use".to_string(),
            ));
        };
        let conn = conn.into_inner().map_err(|_| {
            CatalogError::StorageUnavailable("cache connection is poisoned".to_string())
        })?;
        conn.close().map_err(|(_, e)| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LangNames, Singer, Software, SoftwareCategory, Variant};
    use tempfile::TempDir;

    fn en(name: &str) -> LangNames {
        [("en".to_string(), name.to_string())].into_iter().collect()
    }

    fn singer(id: &str, name: &str) -> Singer {
        Singer {
            id: id.to_string(),
            names: en(name),
            owners: vec![],
            authors: vec![],
            homepage_url: None,
            profile_image_url: None,
            variants: vec![Variant {
                id: format!("{}_std", id),
                names: en(name),
                file_url: Some(format!("https://example.com/{}.zip", id)),
                download_page_url: None,
                tags: vec![],
            }],
        }
    }

    fn software(id: &str) -> Software {
        Software {
            id: id.to_string(),
            names: en(id),
            category: SoftwareCategory::Host,
            developers: vec![],
            homepage_url: None,
            file_url: None,
            download_page_url: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_put_and_get_records() {
        let cache = SqliteCache::in_memory();
        cache.put(&singer("hana", "Hana")).await.unwrap();
        cache
            .put_many(&[singer("iro", "Iro"), singer("jun", "Jun")])
            .await
            .unwrap();

        let mut all: Vec<Singer> = cache.get_all().await.unwrap();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(
            all.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            vec!["hana", "iro", "jun"]
        );

        let iro: Option<Singer> = cache.get_by_id("iro").await.unwrap();
        assert_eq!(iro, Some(singer("iro", "Iro")));
        let missing: Option<Singer> = cache.get_by_id("zed").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_record() {
        let cache = SqliteCache::in_memory();
        cache.put(&singer("hana", "Hana")).await.unwrap();
        cache.put(&singer("hana", "Hana v2")).await.unwrap();

        let all: Vec<Singer> = cache.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].names["en"], "Hana v2");
    }

    #[tokio::test]
    async fn test_partitions_are_disjoint() {
        let cache = SqliteCache::in_memory();
        cache.put(&singer("same", "Same")).await.unwrap();
        cache.put(&software("same")).await.unwrap();

        assert_eq!(cache.count(Category::Singer).await.unwrap(), 1);
        assert_eq!(cache.count(Category::Software).await.unwrap(), 1);

        cache.clear(Partition::Singers).await.unwrap();
        assert_eq!(cache.count(Category::Singer).await.unwrap(), 0);
        let softwares: Vec<Software> = cache.get_all().await.unwrap();
        assert_eq!(softwares, vec![software("same")]);
    }

    #[tokio::test]
    async fn test_last_updated_tracks_record_writes() {
        let cache = SqliteCache::in_memory();
        assert_eq!(cache.last_updated(Category::Singer).await.unwrap(), None);

        let before = chrono::Utc::now().timestamp();
        cache.put(&singer("hana", "Hana")).await.unwrap();
        let after = chrono::Utc::now().timestamp();

        let updated = cache.last_updated(Category::Singer).await.unwrap().unwrap();
        assert!(updated >= before && updated <= after);
        assert_eq!(cache.last_updated(Category::Software).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_meta_roundtrip() {
        let cache = SqliteCache::in_memory();
        assert_eq!(cache.get_meta("singer:file:h.json").await.unwrap(), None);

        cache.set_meta("singer:file:h.json", 1000).await.unwrap();
        cache.set_meta("singer:file:h.json", 2000).await.unwrap();
        assert_eq!(
            cache.get_meta("singer:file:h.json").await.unwrap(),
            Some(2000)
        );

        cache.clear(Partition::SyncMeta).await.unwrap();
        assert_eq!(cache.get_meta("singer:file:h.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_commit_shards_writes_records_and_timestamps() {
        let cache = SqliteCache::in_memory();
        cache
            .commit_shards(
                &[singer("hana", "Hana"), singer("kai", "Kai")],
                &[
                    ManifestEntry::new("h.json", 1000),
                    ManifestEntry::new("k.json", 1500),
                ],
            )
            .await
            .unwrap();
        cache.set_meta("software:file:o.json", 7).await.unwrap();

        assert_eq!(cache.count(Category::Singer).await.unwrap(), 2);
        assert_eq!(
            cache.shard_timestamps(Category::Singer).await.unwrap(),
            vec![("h.json".to_string(), 1000), ("k.json".to_string(), 1500)]
        );
        assert_eq!(
            cache.shard_timestamps(Category::Software).await.unwrap(),
            vec![("o.json".to_string(), 7)]
        );
    }

    #[tokio::test]
    async fn test_cache_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cache.db");

        let cache = SqliteCache::new(&db_path);
        cache.put(&singer("hana", "Hana")).await.unwrap();
        cache.set_meta("singer:file:h.json", 1000).await.unwrap();
        cache.close().unwrap();

        let reopened = SqliteCache::new(&db_path);
        let all: Vec<Singer> = reopened.get_all().await.unwrap();
        assert_eq!(all, vec![singer("hana", "Hana")]);
        assert_eq!(
            reopened.get_meta("singer:file:h.json").await.unwrap(),
            Some(1000)
        );
    }

    #[tokio::test]
    async fn test_unopenable_database_is_storage_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("missing-dir").join("cache.db");

        let cache = SqliteCache::new(&db_path);
        let result = cache.get_all::<Singer>().await;
        assert!(matches!(result, Err(CatalogError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_skipped() {
        let cache = SqliteCache::in_memory();
        cache.put(&singer("hana", "Hana")).await.unwrap();
        cache
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO singers (id, body) VALUES ('bad', '{\"id\": 3}')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let all: Vec<Singer> = cache.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        let bad: Option<Singer> = cache.get_by_id("bad").await.unwrap();
        assert!(bad.is_none());
    }
}
