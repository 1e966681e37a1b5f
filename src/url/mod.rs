//! URL handling module for Site-Harvester
//!
//! This module normalizes submitted site URLs into crawl roots and decides
//! which discovered anchors become frontier paths.

mod domain;
mod filter;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::extract_authority;
pub use filter::filter_link;
pub use matcher::is_same_site;
pub use normalize::{normalize_site_url, SiteRoot};
