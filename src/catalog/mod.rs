mod models;
mod search;
mod validation;

pub use models::*;
pub use search::search;
pub use validation::{validate_singer, validate_software, ValidationError, ValidationResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The two record categories served by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Singer,
    Software,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Singer, Category::Software];

    /// Name used in sync metadata keys, e.g. `singer:file:h.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Singer => "singer",
            Category::Software => "software",
        }
    }

    /// Directory under `/data/` holding this category's shards.
    pub fn data_dir(&self) -> &'static str {
        match self {
            Category::Singer => "singers",
            Category::Software => "softwares",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singer" | "singers" => Some(Category::Singer),
            "software" | "softwares" => Some(Category::Software),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that can be cached, synced and searched.
pub trait CatalogRecord:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const CATEGORY: Category;

    fn id(&self) -> &str;

    fn names(&self) -> &BTreeMap<String, String>;

    fn validate(&self) -> ValidationResult<()>;

    /// Every string a search query may match against, besides id and names.
    fn search_terms(&self) -> Vec<&str>;

    /// Name in `lang`, falling back to English, then to any name, then to the id.
    fn display_name(&self, lang: &str) -> &str {
        let names = self.names();
        names
            .get(lang)
            .or_else(|| names.get(DEFAULT_LANG))
            .or_else(|| names.values().next())
            .map(String::as_str)
            .unwrap_or_else(|| self.id())
    }
}

pub const DEFAULT_LANG: &str = "en";

impl CatalogRecord for Singer {
    const CATEGORY: Category = Category::Singer;

    fn id(&self) -> &str {
        &self.id
    }

    fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_singer(self)
    }

    fn search_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self
            .owners
            .iter()
            .chain(self.authors.iter())
            .map(String::as_str)
            .collect();
        for variant in &self.variants {
            terms.extend(variant.names.values().map(String::as_str));
            terms.extend(variant.tags.iter().map(String::as_str));
        }
        terms
    }
}

impl CatalogRecord for Software {
    const CATEGORY: Category = Category::Software;

    fn id(&self) -> &str {
        &self.id
    }

    fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_software(self)
    }

    fn search_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.developers.iter().map(String::as_str).collect();
        terms.extend(self.tags.iter().map(String::as_str));
        terms.push(self.category.as_str());
        terms
    }
}
