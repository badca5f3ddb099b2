use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};

/// Offset added to the schema version when stamping `PRAGMA user_version`,
/// so that foreign SQLite files (user_version 0) are never mistaken for ours.
pub const BASE_DB_VERSION: usize = 77000;

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = $crate::sqlite_persistence::Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            _ => None,
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    sql.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    sql.push_str(" NOT NULL");
                }
                if let Some(default_value) = column.default_value {
                    sql.push_str(&format!(" DEFAULT {}", default_value));
                }
                sql
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({});", self.name, columns)
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual: Vec<(String, String, bool, bool)> = stmt
            .query_map(params![], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i32>(3)? == 1,
                    row.get::<_, i32>(5)? == 1,
                ))
            })?
            .collect::<Result<_, _>>()?;

        if actual.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}",
                self.name,
                actual.len(),
                self.columns.len()
            );
        }

        for ((name, sql_type, non_null, is_primary_key), expected) in
            actual.iter().zip(self.columns.iter())
        {
            if name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    name
                );
            }
            if SqlType::from_sql(sql_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    sql_type
                );
            }
            // SQLite reports TEXT primary keys as nullable, only compare the flags we set.
            if *non_null != expected.non_null || *is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} constraint mismatch",
                    self.name,
                    expected.name
                );
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            conn.execute(&table.create_sql(), params![])
                .with_context(|| format!("Failed to create table {}", table.name))?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Reads the schema version stamped in `user_version`, `None` for a database
/// that was never initialized by us.
pub fn read_schema_version(conn: &Connection) -> Result<Option<usize>> {
    let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if raw_version == 0 {
        return Ok(None);
    }
    let version = raw_version - BASE_DB_VERSION as i64;
    if version < 1 {
        bail!("Database version {} is invalid (expected >= 1)", version);
    }
    Ok(Some(version as usize))
}

/// Creates the latest schema on a fresh database, or validates and migrates an
/// existing one.
pub fn initialize_schema(conn: &mut Connection, schemas: &[VersionedSchema]) -> Result<()> {
    let latest = schemas.last().context("No schema versions defined")?;

    let Some(db_version) = read_schema_version(conn)? else {
        return latest.create(conn);
    };

    let index = schemas
        .iter()
        .position(|s| s.version == db_version)
        .with_context(|| format!("Unknown database version {}", db_version))?;
    schemas[index]
        .validate(conn)
        .with_context(|| format!("Schema validation failed for version {}", db_version))?;

    if db_version < latest.version {
        let tx = conn.transaction()?;
        for schema in schemas.iter().skip(index + 1) {
            if let Some(migration_fn) = schema.migration {
                migration_fn(&tx).with_context(|| {
                    format!("Failed to run migration to version {}", schema.version)
                })?;
            }
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest.version),
            [],
        )?;
        tx.commit()?;
    }
    Ok(())
}
