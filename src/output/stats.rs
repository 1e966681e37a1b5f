//! Queue statistics and listings from the site store
//!
//! This module provides functionality for extracting and displaying
//! per-status counts and site listings from the storage layer.

use crate::state::SiteStatus;
use crate::storage::{CrawlJob, SiteStore};
use std::collections::HashMap;

/// Queue statistics summary
#[derive(Debug, Clone)]
pub struct QueueStatistics {
    /// Total number of sites in the store
    pub total_sites: u64,

    /// Count of sites by status
    pub sites_by_status: HashMap<SiteStatus, u64>,
}

impl QueueStatistics {
    /// Count for one status, zero when absent
    pub fn count(&self, status: SiteStatus) -> u64 {
        self.sites_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Returns
///
/// * `Ok(QueueStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(store: &dyn SiteStore) -> crate::Result<QueueStatistics> {
    let sites_by_status = store.count_by_status()?;
    let total_sites = sites_by_status.values().sum();

    Ok(QueueStatistics {
        total_sites,
        sites_by_status,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &QueueStatistics) {
    println!("=== Queue Statistics ===\n");

    println!("Total sites: {}", stats.total_sites);
    println!();

    println!("Sites by Status:");
    for status in SiteStatus::all_states() {
        let count = stats.count(status);
        let percentage = if stats.total_sites > 0 {
            (count as f64 / stats.total_sites as f64) * 100.0
        } else {
            0.0
        };
        println!("  {:<10} {:>6} ({:.1}%)", status, count, percentage);
    }
    println!();

    let finished = stats.count(SiteStatus::Done) + stats.count(SiteStatus::Failed);
    let success_rate = if finished > 0 {
        (stats.count(SiteStatus::Done) as f64 / finished as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} finished crawls done)",
        success_rate,
        stats.count(SiteStatus::Done),
        finished
    );
}

/// Prints one line per site
pub fn print_site_list(sites: &[CrawlJob]) {
    if sites.is_empty() {
        println!("No sites.");
        return;
    }

    println!(
        "{:>6}  {:<10}  {:<10}  {:<25}  {}",
        "ID", "STATUS", "PROGRESS", "UPDATED", "URL"
    );
    for site in sites {
        println!(
            "{:>6}  {:<10}  {:<10}  {:<25}  {}",
            site.id, site.status, site.progress, site.updated_at, site.url
        );
    }
}
