//! Crawl worker: runs the per-site pipeline for each dequeued site
//!
//! ```text
//! Worker
//!     │
//!     ├─► Dedup guard (skip duplicates)
//!     ├─► Load the site record
//!     ├─► Mark processing
//!     ├─► Crawl engine
//!     ├─► Publish result blob
//!     └─► Mark done / failed
//! ```

use crate::crawler::CrawlEngine;
use crate::jobs::guard::{DedupGuard, GuardDecision};
use crate::output::publish;
use crate::state::SiteStatus;
use crate::storage::{ClaimedSite, SiteStore};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Queue end shared by every worker in a pool
pub type SharedQueue = Arc<Mutex<mpsc::Receiver<ClaimedSite>>>;

pub struct Worker {
    id: usize,
    engine: Arc<CrawlEngine>,
    store: Arc<dyn SiteStore>,
    guard: DedupGuard,
}

impl Worker {
    pub fn new(id: usize, engine: Arc<CrawlEngine>, store: Arc<dyn SiteStore>) -> Self {
        let guard = DedupGuard::new(store.clone());
        Self {
            id,
            engine,
            store,
            guard,
        }
    }

    /// Drains the queue until it is closed and empty
    pub async fn run(self, queue: SharedQueue) {
        tracing::debug!(worker = self.id, "Worker started");

        loop {
            // The lock is held only while waiting for the next site
            let next = { queue.lock().await.recv().await };
            let Some(site) = next else {
                break;
            };
            self.process(site).await;
        }

        tracing::debug!(worker = self.id, "Worker stopped");
    }

    /// Runs one claimed site through the pipeline
    ///
    /// Store write failures along the way are logged and never abort the
    /// pipeline; only the crawl and publish steps decide the outcome.
    ///
    /// # Returns
    ///
    /// The terminal status reached, or `None` if the site was skipped
    /// without a status change
    pub async fn process(&self, site: ClaimedSite) -> Option<SiteStatus> {
        let worker = self.id;

        if self.guard.check(&site) == GuardDecision::Duplicate {
            tracing::info!(worker, job_id = site.id, url = %site.url, "Duplicate site, skipping");
            return Some(SiteStatus::Duplicate);
        }

        let job = match self.store.get_by_id(site.id) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(worker, job_id = site.id, url = %site.url, error = %e, "Failed to find record");
                return None;
            }
        };

        if !job.status.can_transition_to(SiteStatus::Processing) {
            tracing::warn!(
                worker,
                job_id = job.id,
                url = %job.url,
                status = %job.status,
                "Site is no longer scheduled, skipping"
            );
            return None;
        }

        tracing::info!(worker, job_id = job.id, url = %job.url, "Started job");

        if let Err(e) = self
            .store
            .update_status(job.id, SiteStatus::Processing, &job.progress)
        {
            tracing::error!(worker, job_id = job.id, url = %job.url, error = %e, "Failed to mark processing");
        }

        let (status, progress) = match self.engine.crawl(&job).await {
            Ok(outcome) => match publish(self.store.as_ref(), &job, &outcome.pages) {
                Ok(_) => (SiteStatus::Done, outcome.progress),
                Err(e) => {
                    tracing::error!(worker, job_id = job.id, url = %job.url, error = %e, "Failed to publish result");
                    (SiteStatus::Failed, outcome.progress)
                }
            },
            Err(e) => {
                tracing::error!(worker, job_id = job.id, url = %job.url, error = %e, "Crawl failed");
                (SiteStatus::Failed, job.progress.clone())
            }
        };

        if let Err(e) = self.store.update_status(job.id, status, &progress) {
            tracing::error!(worker, job_id = job.id, url = %job.url, error = %e, "Failed to write final status");
        }

        tracing::info!(worker, job_id = job.id, url = %job.url, status = %status, progress = %progress, "Completed job");

        Some(status)
    }
}
