//! Fixed-size pool of crawl workers sharing one queue

use crate::crawler::CrawlEngine;
use crate::jobs::worker::{SharedQueue, Worker};
use crate::storage::{ClaimedSite, SiteStore};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` workers draining `queue`
    pub fn spawn(
        worker_count: usize,
        engine: Arc<CrawlEngine>,
        store: Arc<dyn SiteStore>,
        queue: mpsc::Receiver<ClaimedSite>,
    ) -> Self {
        let shared: SharedQueue = Arc::new(Mutex::new(queue));

        let handles = (0..worker_count)
            .map(|id| {
                let worker = Worker::new(id, engine.clone(), store.clone());
                tokio::spawn(worker.run(shared.clone()))
            })
            .collect();

        tracing::info!(workers = worker_count, "Worker pool started");

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit
    ///
    /// Workers exit once the queue's sender is dropped and the queue is empty.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}
