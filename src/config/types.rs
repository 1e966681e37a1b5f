use serde::Deserialize;
use std::time::Duration;

/// Default number of pending sites claimed per poll
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Main configuration structure for Site-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub workers: WorkerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub storage: StorageConfig,
}

/// Per-site crawl behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Time to wait before every page fetch (seconds)
    #[serde(rename = "request-delay-seconds")]
    pub request_delay_seconds: u64,

    /// Time a single page may take to load (seconds)
    #[serde(rename = "page-timeout-seconds")]
    pub page_timeout_seconds: u64,

    /// Maximum number of pages visited on one site
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// Path suffixes that are never followed
    #[serde(rename = "avoided-extensions", default)]
    pub avoided_extensions: Vec<String>,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_seconds)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }
}

/// Job source and worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent crawl workers
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Interval between polls for pending sites (seconds)
    #[serde(rename = "poll-interval-seconds")]
    pub poll_interval_seconds: u64,

    /// Maximum number of sites claimed per poll
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User agent presented to target sites
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0"
        .to_string()
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
