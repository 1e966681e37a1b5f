//! State module for tracking crawl job progress
//!
//! # Components
//!
//! - `SiteStatus`: the lifecycle of a site record in the crawl queue
//! - `Progress`: the "visited/total" counter written alongside the status

mod progress;
mod site_status;

// Re-export main types
pub use progress::Progress;
pub use site_status::SiteStatus;
