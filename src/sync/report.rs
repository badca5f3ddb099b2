use crate::catalog::Category;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardFailure {
    pub file: String,
    pub reason: String,
}

/// Outcome of one sync pass over a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub category: Category,
    /// Shards fetched and committed in this pass.
    pub fetched: Vec<String>,
    /// Shards that changed but could not be fetched, kept for the next pass.
    pub failed: Vec<ShardFailure>,
    pub unchanged: usize,
    pub records_written: usize,
}

impl SyncReport {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            fetched: Vec::new(),
            failed: Vec::new(),
            unchanged: 0,
            records_written: 0,
        }
    }

    /// True when nothing needed fetching.
    pub fn is_noop(&self) -> bool {
        self.fetched.is_empty() && self.failed.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sync: {} shards fetched ({} records), {} failed, {} unchanged",
            self.category,
            self.fetched.len(),
            self.records_written,
            self.failed.len(),
            self.unchanged
        )
    }
}
