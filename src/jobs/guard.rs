//! Duplicate detection for claimed sites
//!
//! Several intake records may share a URL. Before a worker crawls a claimed
//! site, the guard checks whether another record with the same URL is
//! already being crawled or has been crawled, and if so retires this one as
//! `duplicate`.
//!
//! The lookup is a cheap pre-check; the store re-checks siblings and marks
//! the site in one transaction, so a sibling that stops blocking in between
//! lets the site proceed.
//!
//! The check is best effort. Two records with the same URL claimed in one
//! batch can reach two workers at nearly the same time; both may see no
//! `processing` or `done` sibling and both will crawl. This race is accepted.

use crate::storage::{ClaimedSite, SiteStore};
use std::sync::Arc;

/// What a worker should do with a claimed site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// No sibling blocks this site; crawl it
    Proceed,
    /// The site was marked `duplicate`; skip it
    Duplicate,
}

pub struct DedupGuard {
    store: Arc<dyn SiteStore>,
}

impl DedupGuard {
    pub fn new(store: Arc<dyn SiteStore>) -> Self {
        Self { store }
    }

    /// Checks a claimed site against other records with the same URL
    ///
    /// Sites without a URL always proceed. A store error while looking up
    /// siblings is logged and the site proceeds.
    pub fn check(&self, site: &ClaimedSite) -> GuardDecision {
        if site.url.is_empty() {
            return GuardDecision::Proceed;
        }

        let siblings = match self.store.find_by_url(&site.url) {
            Ok(siblings) => siblings,
            Err(e) => {
                tracing::error!(job_id = site.id, url = %site.url, error = %e, "Failed to look up sites sharing URL");
                return GuardDecision::Proceed;
            }
        };

        let blocker = siblings
            .iter()
            .find(|other| other.id != site.id && other.status.blocks_duplicates());

        let Some(blocker) = blocker else {
            return GuardDecision::Proceed;
        };

        tracing::debug!(
            job_id = site.id,
            url = %site.url,
            blocked_by = blocker.id,
            status = %blocker.status,
            "Duplicate site candidate"
        );

        match self.store.mark_duplicate(site.id) {
            Ok(true) => GuardDecision::Duplicate,
            Ok(false) => {
                tracing::debug!(job_id = site.id, url = %site.url, "Blocking site changed status, proceeding");
                GuardDecision::Proceed
            }
            Err(e) => {
                tracing::error!(job_id = site.id, url = %site.url, error = %e, "Failed to mark site duplicate");
                GuardDecision::Duplicate
            }
        }
    }
}
