//! Crawl engine - breadth-first walk of a single site
//!
//! This module contains the per-site crawl loop, including:
//! - Normalizing the submitted root URL
//! - Walking the frontier in discovery order up to the page limit
//! - Filtering discovered links into same-site paths
//! - Checkpointing progress to the store
//! - Ad-hoc single page scrapes

use crate::config::CrawlerConfig;
use crate::crawler::scheduler::{pace, Frontier};
use crate::crawler::PageFetcher;
use crate::state::{Progress, SiteStatus};
use crate::storage::{CrawlJob, SiteStore};
use crate::url::{filter_link, normalize_site_url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Output for one successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub title: String,
    /// Absolute URL: scheme, authority and path
    pub url: String,
    /// Visible text with newlines replaced by spaces
    pub content: String,
}

/// Result of crawling one site
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Pages in the order they were visited
    pub pages: Vec<PageResult>,
    /// Last "visited/total" value, to be written with the final status
    pub progress: String,
}

/// Crawls sites through an injected fetcher, checkpointing to an injected store
///
/// One engine is shared by every worker; it holds no per-crawl state.
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn SiteStore>,
    config: CrawlerConfig,
}

impl CrawlEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn SiteStore>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            config,
        }
    }

    /// Crawls one site breadth-first
    ///
    /// # Crawl Loop
    ///
    /// 1. Normalize the root URL; a malformed root fails the crawl
    /// 2. Seed the frontier with the root page (the empty path)
    /// 3. For each frontier entry while under the page limit:
    ///    - wait the request delay, then fetch with the page timeout
    ///    - on error, log and move on to the next entry
    ///    - on success, record the page and queue its same-site links
    ///    - update progress, writing it to the store every fifth page
    ///
    /// A job without a URL visits nothing and succeeds with no pages.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Pages visited and the last progress value
    /// * `Err(HarvestError)` - The root URL could not be parsed
    pub async fn crawl(&self, job: &CrawlJob) -> crate::Result<CrawlOutcome> {
        let mut outcome = CrawlOutcome {
            pages: Vec::new(),
            progress: job.progress.clone(),
        };

        if job.url.trim().is_empty() {
            tracing::info!(job_id = job.id, "Site has no URL, nothing to crawl");
            return Ok(outcome);
        }

        let root = normalize_site_url(&job.url)?;
        let mut frontier = Frontier::with_root();

        let mut index = 0;
        while index < frontier.len() && index < self.config.page_limit {
            let Some(path) = frontier.get(index).map(str::to_string) else {
                break;
            };
            let page_url = root.page_url(&path);

            pace(self.config.request_delay()).await;

            let page = match self
                .fetcher
                .fetch(&page_url, self.config.page_timeout())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(job_id = job.id, url = %page_url, error = %e, "Failed to load page");
                    index += 1;
                    continue;
                }
            };

            tracing::debug!(job_id = job.id, url = %page_url, "Visited page");

            for anchor in &page.anchors {
                if let Some(link) = filter_link(anchor, &root, &self.config.avoided_extensions) {
                    if frontier.push(link) {
                        tracing::debug!(job_id = job.id, link = %anchor, "Queued link");
                    }
                }
            }

            outcome.pages.push(PageResult {
                title: page.title,
                url: page_url,
                content: collapse_newlines(&page.text),
            });

            let progress = Progress::after(index, frontier.len());
            outcome.progress = progress.to_string();

            if Progress::is_checkpoint(index) {
                if let Err(e) =
                    self.store
                        .update_status(job.id, SiteStatus::Processing, &outcome.progress)
                {
                    tracing::error!(job_id = job.id, error = %e, "Failed to checkpoint progress");
                }
            }

            index += 1;
        }

        tracing::info!(
            job_id = job.id,
            url = %job.url,
            pages = outcome.pages.len(),
            progress = %outcome.progress,
            "Crawl finished"
        );

        Ok(outcome)
    }
}

/// Fetches one page for an ad-hoc scrape
///
/// `http://` is prepended when the URL has no scheme. Any failure yields
/// `None`; nothing is persisted.
pub async fn scrape_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    timeout: Duration,
) -> Option<PageResult> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let target = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    match fetcher.fetch(&target, timeout).await {
        Ok(page) => Some(PageResult {
            title: page.title,
            url: target,
            content: collapse_newlines(&page.text),
        }),
        Err(e) => {
            tracing::warn!(url = %target, error = %e, "Ad-hoc scrape failed");
            None
        }
    }
}

/// Replaces every line break with a single space
fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}
