//! Output module for crawl results and queue reporting
//!
//! This module handles:
//! - Merging crawl output into site metadata and publishing it as a blob
//! - Per-status queue statistics
//! - Site listings for the command line

mod publisher;
pub mod stats;

pub use publisher::{merge_results, publish, DATA_KEY};
pub use stats::{load_statistics, print_site_list, print_statistics, QueueStatistics};
