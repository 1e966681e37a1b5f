//! Storage traits and error types
//!
//! This module defines the trait interface for site store backends and
//! associated error types.

use crate::state::SiteStatus;
use crate::storage::{ClaimedSite, CrawlJob, UrlMatch};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Site not found: {0}")]
    SiteNotFound(i64),

    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: SiteStatus, to: SiteStatus },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for site store implementations
///
/// The store is shared by the job source and every worker, so all methods
/// take `&self` and implementations must serialize access internally.
/// Operations documented as transactional must be atomic with respect to
/// concurrent callers; the rest are single-statement best-effort writes.
pub trait SiteStore: Send + Sync {
    // ===== Intake =====

    /// Inserts a new site with status `pending` and empty progress
    ///
    /// # Returns
    ///
    /// The ID assigned by the store
    fn insert_site(&self, name: &str, url: &str, metadata: &str) -> StorageResult<i64>;

    // ===== Queue =====

    /// Claims up to `batch_size` pending sites, moving them to `scheduled`
    ///
    /// Selection and status change happen in one transaction, so a site is
    /// returned by at most one call until it is reset to `pending`.
    fn claim_pending(&self, batch_size: usize) -> StorageResult<Vec<ClaimedSite>>;

    /// Finds every site whose URL is exactly `url`
    fn find_by_url(&self, url: &str) -> StorageResult<Vec<UrlMatch>>;

    /// Marks a site as `duplicate` if another site with its URL is
    /// `processing` or `done`
    ///
    /// The sibling check and the status change happen in one transaction.
    ///
    /// # Returns
    ///
    /// Whether the site was marked
    fn mark_duplicate(&self, id: i64) -> StorageResult<bool>;

    /// Gets a site by ID
    fn get_by_id(&self, id: i64) -> StorageResult<CrawlJob>;

    /// Writes status and progress for a site
    fn update_status(&self, id: i64, status: SiteStatus, progress: &str) -> StorageResult<()>;

    /// Returns a terminal site to `pending` so it is crawled again
    fn reset_status(&self, id: i64) -> StorageResult<()>;

    // ===== Blobs =====

    /// Stores a blob, replacing any existing blob with the same name
    fn put_blob(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Gets a blob by name
    fn get_blob(&self, name: &str) -> StorageResult<Vec<u8>>;

    // ===== Listing =====

    /// Lists every site ordered by ID
    fn list_sites(&self) -> StorageResult<Vec<CrawlJob>>;

    /// Counts sites by status
    fn count_by_status(&self) -> StorageResult<HashMap<SiteStatus, u64>>;
}
