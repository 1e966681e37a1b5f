//! Page fetch capability
//!
//! This module defines the seam between the crawl engine and whatever
//! actually retrieves pages, plus the default HTTP implementation:
//! - One shared HTTP client with a desktop user agent
//! - A per-request timeout so one slow page never stalls another
//! - Error classification into timeout, status, transport and body errors

use crate::config::FetcherConfig;
use crate::crawler::parse_html;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Maximum redirect hops followed for a single page
const MAX_REDIRECTS: usize = 10;

/// Errors from a single page fetch
///
/// None of these are fatal to a crawl; the engine skips the page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out fetching {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// A rendered page as seen by the crawl engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// Document title, empty when the page has none
    pub title: String,
    /// Visible body text; may contain newlines
    pub text: String,
    /// Raw `href` values of every anchor, in document order
    pub anchors: Vec<String>,
}

/// Retrieves a page within a bounded time
///
/// Implementations are shared by every worker, so a fetch must not hold
/// state that another concurrent fetch could disturb.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default fetcher: plain HTTP GET plus HTML parsing
///
/// The client's connection pool is shared across all workers; each call
/// gets its own request timeout.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!(url, bytes = body.len(), "Fetched page");

        Ok(parse_html(&body))
    }
}
