//! Storage module for the crawl queue and published documents
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Site intake, claiming and status tracking
//! - Duplicate lookups by URL
//! - Named blob storage for crawl output

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteSiteStore;
pub use traits::{SiteStore, StorageError, StorageResult};

use crate::state::SiteStatus;

use std::path::Path;

/// Initializes or opens a site store database
///
/// Failure here is the one storage error that is fatal to the whole process.
pub fn open_storage(path: &Path) -> crate::Result<SqliteSiteStore> {
    SqliteSiteStore::new(path)
}

/// A crawl target as persisted in the `sites` table
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Opaque JSON supplied at intake; crawl output is merged into it
    pub metadata: String,
    pub status: SiteStatus,
    pub progress: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CrawlJob {
    /// Name made safe for use as a file or blob name
    ///
    /// Path separators become `-` and double quotes are dropped.
    pub fn sanitized_name(&self) -> String {
        sanitize_name(&self.name)
    }

    /// Name of the blob this site's crawl output is published under
    pub fn blob_name(&self) -> String {
        format!("{}.json", self.sanitized_name())
    }
}

/// Strips path separators and quote characters from a site name
pub fn sanitize_name(name: &str) -> String {
    name.replace('/', "-").replace('"', "")
}

/// A site handed out by [`SiteStore::claim_pending`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedSite {
    pub id: i64,
    pub url: String,
}

/// A site sharing a URL, as returned by [`SiteStore::find_by_url`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlMatch {
    pub id: i64,
    pub status: SiteStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_named(name: &str) -> CrawlJob {
        CrawlJob {
            id: 1,
            name: name.to_string(),
            url: "example.com".to_string(),
            metadata: "{}".to_string(),
            status: SiteStatus::Pending,
            progress: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_sanitize_replaces_slashes() {
        assert_eq!(sanitize_name("Acme/Widgets/EU"), "Acme-Widgets-EU");
    }

    #[test]
    fn test_sanitize_drops_quotes() {
        assert_eq!(sanitize_name(r#""Acme" Corp"#), "Acme Corp");
    }

    #[test]
    fn test_blob_name() {
        assert_eq!(job_named(r#"A/B "C""#).blob_name(), "A-B C.json");
    }
}
