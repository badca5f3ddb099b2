//! SQLite schema for the local catalog cache.
//!
//! Records are stored as their JSON bodies keyed by id, one table per
//! category. Sync metadata lives in its own key-value table.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

// =============================================================================
// Version 1 - Record partitions and sync metadata
// =============================================================================

const SINGERS_TABLE_V1: Table = Table {
    name: "singers",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("body", &SqlType::Text, non_null = true),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
};

const SOFTWARES_TABLE_V1: Table = Table {
    name: "softwares",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("body", &SqlType::Text, non_null = true),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
};

/// Keys look like `singer:file:h.json`, values are manifest timestamps in ms.
const SYNC_META_TABLE_V1: Table = Table {
    name: "sync_meta",
    columns: &[
        sqlite_column!("key", &SqlType::Text, is_primary_key = true),
        sqlite_column!("value", &SqlType::Integer, non_null = true),
    ],
};

pub const CACHE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[SINGERS_TABLE_V1, SOFTWARES_TABLE_V1, SYNC_META_TABLE_V1],
    migration: None,
}];
