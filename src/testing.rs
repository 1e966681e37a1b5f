//! Test doubles shared by unit tests across modules

use crate::config::CrawlerConfig;
use crate::crawler::{FetchError, FetchedPage, PageFetcher};
use crate::state::SiteStatus;
use crate::storage::{
    ClaimedSite, CrawlJob, SiteStore, SqliteSiteStore, StorageError, StorageResult, UrlMatch,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Crawler settings with no delay and a short timeout
pub fn crawler_config() -> CrawlerConfig {
    CrawlerConfig {
        request_delay_seconds: 0,
        page_timeout_seconds: 5,
        page_limit: 10,
        avoided_extensions: vec![".pdf".to_string(), ".jpg".to_string()],
    }
}

pub fn fetched_page(title: &str, text: &str, anchors: &[&str]) -> FetchedPage {
    FetchedPage {
        title: title.to_string(),
        text: text.to_string(),
        anchors: anchors.iter().map(|a| a.to_string()).collect(),
    }
}

/// Serves canned pages by exact URL; anything else is a 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, FetchedPage>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, page: FetchedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Handle to the list of URLs requested so far
    pub fn fetched(&self) -> Arc<Mutex<Vec<String>>> {
        self.fetched.clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// In-memory store that records status writes and can refuse blob writes
pub struct RecordingStore {
    inner: SqliteSiteStore,
    updates: Mutex<Vec<(i64, SiteStatus, String)>>,
    fail_blobs: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteSiteStore::open_in_memory().unwrap(),
            updates: Mutex::new(Vec::new()),
            fail_blobs: false,
        }
    }

    pub fn failing_blobs() -> Self {
        Self {
            fail_blobs: true,
            ..Self::new()
        }
    }

    /// Every `update_status` call, in order
    pub fn status_updates(&self) -> Vec<(i64, SiteStatus, String)> {
        self.updates.lock().unwrap().clone()
    }
}

impl SiteStore for RecordingStore {
    fn insert_site(&self, name: &str, url: &str, metadata: &str) -> StorageResult<i64> {
        self.inner.insert_site(name, url, metadata)
    }

    fn claim_pending(&self, batch_size: usize) -> StorageResult<Vec<ClaimedSite>> {
        self.inner.claim_pending(batch_size)
    }

    fn find_by_url(&self, url: &str) -> StorageResult<Vec<UrlMatch>> {
        self.inner.find_by_url(url)
    }

    fn mark_duplicate(&self, id: i64) -> StorageResult<bool> {
        self.inner.mark_duplicate(id)
    }

    fn get_by_id(&self, id: i64) -> StorageResult<CrawlJob> {
        self.inner.get_by_id(id)
    }

    fn update_status(&self, id: i64, status: SiteStatus, progress: &str) -> StorageResult<()> {
        self.updates
            .lock()
            .unwrap()
            .push((id, status, progress.to_string()));
        self.inner.update_status(id, status, progress)
    }

    fn reset_status(&self, id: i64) -> StorageResult<()> {
        self.inner.reset_status(id)
    }

    fn put_blob(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        if self.fail_blobs {
            return Err(StorageError::Database("blob table unavailable".to_string()));
        }
        self.inner.put_blob(name, data)
    }

    fn get_blob(&self, name: &str) -> StorageResult<Vec<u8>> {
        self.inner.get_blob(name)
    }

    fn list_sites(&self) -> StorageResult<Vec<CrawlJob>> {
        self.inner.list_sites()
    }

    fn count_by_status(&self) -> StorageResult<HashMap<SiteStatus, u64>> {
        self.inner.count_by_status()
    }
}
