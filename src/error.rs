//! Error taxonomy shared by the cache, the sync engine and the read API.

use crate::catalog::{Category, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The local cache database could not be opened or used.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The requested record is absent even after a sync attempt.
    #[error("{category} '{id}' not found")]
    NotFound { category: Category, id: String },

    /// The manifest is missing or unreadable. Callers treat this as an
    /// empty manifest.
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::StorageUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        CatalogError::StorageUnavailable(format!("Storage task failed: {}", err))
    }
}

/// Failure to obtain a usable payload for a single shard.
///
/// These never abort a sync pass, the shard is skipped and retried later.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected status {0}")]
    HttpStatus(u16),

    #[error("Empty payload")]
    EmptyPayload,

    #[error("Payload is not a valid record array: {0}")]
    Malformed(String),

    #[error("Invalid record '{id}': {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: ValidationError,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
