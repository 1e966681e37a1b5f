//! Job acquisition and execution
//!
//! This module turns the site store into a work queue:
//! - The job source claims pending sites on an interval
//! - A bounded channel carries them to the worker pool
//! - Each worker runs the dedup guard, the crawl and the publish step
//!
//! The channel holds at most one site per worker, so a busy pool stalls the
//! poller instead of claiming more than it can start.

mod guard;
mod pool;
mod source;
mod worker;

pub use guard::{DedupGuard, GuardDecision};
pub use pool::WorkerPool;
pub use source::JobSource;
pub use worker::{SharedQueue, Worker};

use crate::config::Config;
use crate::crawler::{CrawlEngine, PageFetcher};
use crate::storage::SiteStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Runs the job source and worker pool until shutdown
///
/// When `shutdown` flips to `true` (or its sender is dropped) the source
/// stops claiming, the queue closes, and workers finish every site they
/// already received before this returns.
pub async fn run_harvester(
    config: &Config,
    store: Arc<dyn SiteStore>,
    fetcher: Arc<dyn PageFetcher>,
    shutdown: watch::Receiver<bool>,
) {
    let worker_count = config.workers.worker_count;
    let (tx, rx) = mpsc::channel(worker_count);

    let engine = Arc::new(CrawlEngine::new(
        fetcher,
        store.clone(),
        config.crawler.clone(),
    ));
    let pool = WorkerPool::spawn(worker_count, engine, store.clone(), rx);

    let source = JobSource::new(
        store,
        config.workers.batch_size,
        config.workers.poll_interval(),
    );

    tracing::info!(
        workers = worker_count,
        batch_size = config.workers.batch_size,
        poll_interval_secs = config.workers.poll_interval_seconds,
        "Harvester started"
    );

    source.run(tx, shutdown).await;
    pool.join().await;

    tracing::info!("Harvester stopped");
}
