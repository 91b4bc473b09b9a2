//! # contract: trait seams between the scrape pipeline and the outside world
//!
//! The pipeline only talks to three external systems: the website it scrapes,
//! the object store that receives markdown, and the key-value store that holds
//! content hashes. Each one sits behind a trait defined here so the pipeline can
//! run against the real backends, the local filesystem, or `mockall` mocks.
//!
//! ## Interface & Extensibility
//! - Implement [`PageFetcher`] for new ways of retrieving HTML.
//! - Implement [`ObjectStore`] / [`HashStore`] for new storage destinations.
//! - All methods are async and return boxed errors ([`StoreError`]).
//!
//! ## Mocking & Testing
//! - The traits are annotated for `mockall` (behind the `test-export-mocks`
//!   feature) so integration tests can script every backend call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type shared by all backend traits.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Stored digest of a page's primary section, keyed by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub url: String,
    /// SHA-256 of the primary section HTML, lowercase hex.
    pub hash: String,
}

/// Outcome of comparing a fresh hash with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// No record existed for the URL.
    New,
    /// A record existed with a different hash and was overwritten.
    Changed,
    /// The stored hash matched; nothing was written.
    Unchanged,
}

/// A page as it moves through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub url: String,
    pub raw_html: String,
    pub primary_html: String,
    pub normalized_html: String,
    pub markdown: String,
}

/// Retrieves raw HTML for a URL.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body. Non-success responses are errors.
    async fn fetch(&self, url: &str) -> Result<String, StoreError>;
}

/// Destination for markdown artifacts.
///
/// Writing to an existing key overwrites it.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_markdown(&self, key: &str, markdown: &str) -> Result<(), StoreError>;
}

/// Key-value store for per-URL content hashes.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Fetch the record for a URL, if one exists.
    async fn get_hash(&self, url: &str) -> Result<Option<HashRecord>, StoreError>;

    /// Create or overwrite the record for `record.url`.
    async fn put_hash(&self, record: &HashRecord) -> Result<(), StoreError>;
}
