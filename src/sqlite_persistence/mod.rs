mod versioned_schema;

pub use versioned_schema::{
    initialize_schema, read_schema_version, Column, SqlType, Table, VersionedSchema,
    BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
