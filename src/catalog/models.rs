//! Catalog record models.
//!
//! These mirror the JSON objects stored in the shard files under
//! `/data/singers/` and `/data/softwares/`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language code to display name, e.g. `{"en": "Hanami", "ja": "花見"}`.
pub type LangNames = BTreeMap<String, String>;

// =============================================================================
// Singers
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Singer {
    pub id: String,
    pub names: LangNames,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    pub variants: Vec<Variant>,
}

/// A downloadable voicebank of a singer. Its id is prefixed by the singer's id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub names: LangNames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// =============================================================================
// Softwares
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftwareCategory {
    Host,
    HostExtension,
    Utility,
}

impl SoftwareCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoftwareCategory::Host => "host",
            SoftwareCategory::HostExtension => "host_extension",
            SoftwareCategory::Utility => "utility",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Software {
    pub id: String,
    pub names: LangNames,
    pub category: SoftwareCategory,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
