use crate::config::types::{Config, CrawlerConfig, FetcherConfig, StorageConfig, WorkerConfig};
use crate::{ConfigError, ConfigResult};

/// Upper bound on a single page load
const MAX_PAGE_TIMEOUT_SECONDS: u64 = 600;

/// Upper bound on the worker pool size
const MAX_WORKER_COUNT: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_worker_config(&config.workers)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    // request_delay_seconds may be zero; the delay is still a suspension point

    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page_limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if config.page_timeout_seconds < 1 || config.page_timeout_seconds > MAX_PAGE_TIMEOUT_SECONDS {
        return Err(ConfigError::Validation(format!(
            "page_timeout_seconds must be between 1 and {}, got {}",
            MAX_PAGE_TIMEOUT_SECONDS, config.page_timeout_seconds
        )));
    }

    validate_extensions(&config.avoided_extensions)?;

    Ok(())
}

/// Validates the avoided-extension suffix list
fn validate_extensions(extensions: &[String]) -> ConfigResult<()> {
    for ext in extensions {
        if ext.trim().is_empty() {
            return Err(ConfigError::Validation(
                "avoided_extensions cannot contain empty entries".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates job source and worker pool configuration
fn validate_worker_config(config: &WorkerConfig) -> ConfigResult<()> {
    if config.worker_count < 1 || config.worker_count > MAX_WORKER_COUNT {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and {}, got {}",
            MAX_WORKER_COUNT, config.worker_count
        )));
    }

    if config.poll_interval_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_seconds must be >= 1, got {}",
            config.poll_interval_seconds
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
