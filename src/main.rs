//! Site-Harvester main entry point
//!
//! This is the command-line interface for the Site-Harvester crawl service.

use anyhow::{bail, Context};
use clap::Parser;
use site_harvester::config::{load_config_with_hash, Config};
use site_harvester::crawler::{scrape_page, HttpPageFetcher, PageFetcher};
use site_harvester::output::{load_statistics, print_site_list, print_statistics};
use site_harvester::storage::{open_storage, SiteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Site-Harvester: a queue-driven site crawler
///
/// Site-Harvester claims pending sites from its database, crawls each one
/// breadth-first within its own host, and stores the collected page text
/// as a JSON document per site.
#[derive(Parser, Debug)]
#[command(name = "site-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A queue-driven site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print it without starting workers
    #[arg(long, conflicts_with_all = ["list", "stats", "submit", "scrape", "reset"])]
    dry_run: bool,

    /// List every site and exit
    #[arg(long, conflicts_with_all = ["stats", "submit", "scrape", "reset"])]
    list: bool,

    /// Show per-status counts and exit
    #[arg(long, conflicts_with_all = ["submit", "scrape", "reset"])]
    stats: bool,

    /// Queue a site for crawling and exit
    #[arg(long, num_args = 2, value_names = ["NAME", "URL"], conflicts_with_all = ["scrape", "reset"])]
    submit: Option<Vec<String>>,

    /// Metadata JSON stored with a submitted site
    #[arg(long, value_name = "JSON", requires = "submit")]
    metadata: Option<String>,

    /// Scrape a single page, print it as JSON and exit
    #[arg(long, value_name = "URL", conflicts_with = "reset")]
    scrape: Option<String>,

    /// Return a finished site to pending and exit
    #[arg(long, value_name = "ID")]
    reset: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list {
        handle_list(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(submit) = &cli.submit {
        handle_submit(&config, submit, cli.metadata.as_deref())?;
    } else if let Some(url) = &cli.scrape {
        handle_scrape(&config, url).await?;
    } else if let Some(id) = cli.reset {
        handle_reset(&config, id)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG`, when set, takes precedence over the flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        // Only show errors
        "error"
    } else {
        match verbose {
            0 => "site_harvester=info,warn",
            1 => "site_harvester=debug,info",
            2 => "site_harvester=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn SiteStore>> {
    let store = open_storage(Path::new(&config.storage.database_path)).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.storage.database_path
        )
    })?;
    Ok(Arc::new(store))
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Site-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Request delay: {}s",
        config.crawler.request_delay_seconds
    );
    println!("  Page timeout: {}s", config.crawler.page_timeout_seconds);
    println!("  Page limit: {}", config.crawler.page_limit);
    println!(
        "  Avoided extensions: {}",
        if config.crawler.avoided_extensions.is_empty() {
            "(none)".to_string()
        } else {
            config.crawler.avoided_extensions.join(", ")
        }
    );

    println!("\nWorkers:");
    println!("  Count: {}", config.workers.worker_count);
    println!(
        "  Poll interval: {}s",
        config.workers.poll_interval_seconds
    );
    println!("  Batch size: {}", config.workers.batch_size);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --list mode: prints every site
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let sites = store.list_sites()?;
    print_site_list(&sites);
    Ok(())
}

/// Handles the --stats mode: shows per-status counts
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let store = open_store(config)?;
    let stats = load_statistics(store.as_ref())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --submit mode: queues one site
fn handle_submit(config: &Config, submit: &[String], metadata: Option<&str>) -> anyhow::Result<()> {
    let [name, url] = submit else {
        bail!("--submit takes a NAME and a URL");
    };

    let metadata = metadata.unwrap_or("{}");
    serde_json::from_str::<serde_json::Value>(metadata).context("--metadata is not valid JSON")?;

    let store = open_store(config)?;
    let id = store.insert_site(name, url, metadata)?;

    tracing::info!(job_id = id, url = %url, "Site submitted");
    println!("{}", id);

    Ok(())
}

/// Handles the --scrape mode: one page, no persistence
async fn handle_scrape(config: &Config, url: &str) -> anyhow::Result<()> {
    let fetcher = HttpPageFetcher::new(&config.fetcher).context("Failed to build HTTP client")?;

    let output = match scrape_page(&fetcher, url, config.crawler.page_timeout()).await {
        Some(page) => serde_json::to_string_pretty(&page)?,
        None => "{}".to_string(),
    };
    println!("{}", output);

    Ok(())
}

/// Handles the --reset mode: returns a terminal site to pending
fn handle_reset(config: &Config, id: i64) -> anyhow::Result<()> {
    let store = open_store(config)?;
    store
        .reset_status(id)
        .with_context(|| format!("Failed to reset site {}", id))?;

    println!("Site {} is pending again", id);
    Ok(())
}

/// Handles the main mode: poll and crawl until Ctrl-C
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config)?;
    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpPageFetcher::new(&config.fetcher).context("Failed to build HTTP client")?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, finishing claimed sites");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                // Dropping the sender would stop the harvester
                std::future::pending::<()>().await;
            }
        }
    });

    site_harvester::jobs::run_harvester(&config, store, fetcher, shutdown_rx).await;

    Ok(())
}
