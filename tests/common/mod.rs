//! Common test infrastructure
//!
//! End-to-end tests spawn a [`TestSite`], a real HTTP server hosting shard
//! files and a manifest under `/data/`, and point the sync engine at it.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestSite, H_SHARD_V1};
//!
//! #[tokio::test]
//! async fn test_serves_shard() {
//!     let site = TestSite::spawn().await;
//!     site.put_shard("singers", "h.json", H_SHARD_V1);
//! }
//! ```

mod fixtures;
mod server;

pub use fixtures::*;
pub use server::TestSite;
