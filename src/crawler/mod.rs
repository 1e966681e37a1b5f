//! Crawler module for per-site page walking
//!
//! This module contains the core crawling logic, including:
//! - The page fetch capability and its HTTP implementation
//! - HTML parsing into title, text and anchors
//! - The breadth-first frontier and request pacing
//! - The crawl engine that ties them together

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{scrape_page, CrawlEngine, CrawlOutcome, PageResult};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpPageFetcher, PageFetcher};
pub use parser::parse_html;
pub use scheduler::{pace, Frontier};
