//! Shard manifest supplied by the hosting site.
//!
//! The manifest lists every shard file per category along with its
//! last-modified timestamp (milliseconds since epoch). It is the only signal
//! used to decide whether a cached shard is stale.

use crate::catalog::Category;
use crate::error::{CatalogError, CatalogResult};
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    #[serde(deserialize_with = "deserialize_millis")]
    pub ts: i64,
}

/// Accepts any JSON number, fractional milliseconds are truncated.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|ms| ms.trunc() as i64))
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp {}", number)))
}

impl ManifestEntry {
    pub fn new(file: impl Into<String>, ts: i64) -> Self {
        Self {
            file: file.into(),
            ts,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub singers: Vec<ManifestEntry>,
    pub softwares: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self, category: Category) -> &[ManifestEntry] {
        match category {
            Category::Singer => &self.singers,
            Category::Software => &self.softwares,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.singers.is_empty() && self.softwares.is_empty()
    }

    pub fn parse(json: &str) -> CatalogResult<Self> {
        if json.trim().is_empty() {
            return Err(CatalogError::MalformedManifest(
                "manifest is empty".to_string(),
            ));
        }
        serde_json::from_str(json).map_err(|e| CatalogError::MalformedManifest(e.to_string()))
    }

    /// Like [`Manifest::parse`], but a malformed manifest degrades to an empty
    /// one, meaning there is nothing to sync.
    pub fn parse_lenient(json: &str) -> Self {
        match Self::parse(json) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("{}, nothing will be synced", e);
                Self::default()
            }
        }
    }
}
