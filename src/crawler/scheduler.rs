//! Frontier and pacing for a single site crawl
//!
//! This module handles:
//! - The breadth-first frontier of site-relative paths
//! - Membership checks so a path is queued at most once
//! - The fixed delay between consecutive page requests

use std::collections::HashSet;
use std::time::Duration;

/// Breadth-first queue of paths discovered on one site
///
/// Paths are only ever appended; the crawl walks them by index, so the
/// order of discovery is the order of visiting. A set mirrors the queue so
/// membership checks stay constant time on large sites.
#[derive(Debug, Clone)]
pub struct Frontier {
    paths: Vec<String>,
    seen: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the root page (the empty path)
    pub fn with_root() -> Self {
        let mut frontier = Self {
            paths: Vec::new(),
            seen: HashSet::new(),
        };
        frontier.push(String::new());
        frontier
    }

    /// Appends a path unless it is already queued
    ///
    /// # Returns
    ///
    /// `true` if the path was added
    pub fn push(&mut self, path: String) -> bool {
        if self.seen.contains(&path) {
            return false;
        }
        self.seen.insert(path.clone());
        self.paths.push(path);
        true
    }

    /// Returns the path at `index`, if discovered
    pub fn get(&self, index: usize) -> Option<&str> {
        self.paths.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// Waits out the fixed delay before a page request
pub async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
