//! Job source: claims pending sites and feeds the worker queue

use crate::storage::{ClaimedSite, SiteStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Polls the store for pending sites on a fixed interval
pub struct JobSource {
    store: Arc<dyn SiteStore>,
    batch_size: usize,
    poll_interval: Duration,
}

impl JobSource {
    pub fn new(store: Arc<dyn SiteStore>, batch_size: usize, poll_interval: Duration) -> Self {
        Self {
            store,
            batch_size,
            poll_interval,
        }
    }

    /// Claims one batch and pushes it onto the queue
    ///
    /// Pushing waits while the queue is full, so a slow pool stalls the
    /// poller rather than dropping work. A claim error is logged and the
    /// batch is simply retried on the next tick.
    ///
    /// # Returns
    ///
    /// Number of sites pushed
    pub async fn poll_once(&self, queue: &mpsc::Sender<ClaimedSite>) -> usize {
        let claimed = match self.store.claim_pending(self.batch_size) {
            Ok(claimed) => claimed,
            Err(e) => {
                tracing::error!(error = %e, "Failed to claim pending sites");
                return 0;
            }
        };

        if claimed.is_empty() {
            return 0;
        }

        tracing::info!(count = claimed.len(), "Adding jobs");

        let mut pushed = 0;
        for site in claimed {
            let id = site.id;
            if queue.send(site).await.is_err() {
                tracing::error!(job_id = id, "Worker queue closed, site left scheduled");
                break;
            }
            pushed += 1;
        }
        pushed
    }

    /// Polls until shutdown is signalled
    ///
    /// The first poll happens immediately. A poll in progress always finishes
    /// pushing its batch before shutdown is honoured. Dropping `queue` on
    /// return closes the channel so idle workers exit.
    pub async fn run(self, queue: mpsc::Sender<ClaimedSite>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            self.poll_once(&queue).await;
        }

        tracing::info!("Job source stopped");
    }
}
