//! Bookplate main entry point
//!
//! Command-line interface for the Bookplate catalog scraper.

use bookplate::config::{Config, DEFAULT_BASE_URL};
use bookplate::pipeline;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Bookplate: a concurrent catalog scraper
///
/// Bookplate walks a catalog site category by category, extracts one record
/// per product, and writes one CSV table per category plus the product
/// images under the target directory.
#[derive(Parser, Debug)]
#[command(name = "bookplate")]
#[command(version)]
#[command(about = "Scrape a product catalog into per-category CSV tables", long_about = None)]
struct Cli {
    /// Output directory for CSV tables and the images subdirectory
    #[arg(value_name = "TARGET_DIR", default_value = "output")]
    target_dir: PathBuf,

    /// Catalog root URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Categories processed concurrently
    #[arg(long, default_value_t = 4)]
    max_category_workers: usize,

    /// Products processed concurrently within one category
    #[arg(long, default_value_t = 8)]
    max_product_workers: usize,

    /// Global cap on simultaneous in-flight requests
    #[arg(long, default_value_t = 16)]
    max_inflight_fetches: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Retries per failed fetch (0 disables retrying)
    #[arg(long, default_value_t = 0)]
    fetch_retries: u32,

    /// Skip downloading product images
    #[arg(long)]
    no_images: bool,

    /// Write the CSV row even when the product's image step fails
    #[arg(long)]
    keep_record_on_image_failure: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli);
    tracing::info!(
        "Scraping {} into {}",
        config.base_url,
        config.target_dir.display()
    );

    // Recorded per-product failures still exit 0; only setup and discovery
    // failures are fatal.
    match pipeline::run(config).await {
        Ok(report) => {
            if !report.failures.is_empty() {
                tracing::warn!(
                    "Run completed with {} recorded failures",
                    report.failures.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Maps CLI arguments onto the pipeline configuration
fn build_config(cli: &Cli) -> Config {
    let mut config = Config::new(cli.target_dir.clone());
    config.base_url = cli.base_url.trim_end_matches('/').to_string();
    config.limits.max_category_workers = cli.max_category_workers;
    config.limits.max_product_workers = cli.max_product_workers;
    config.limits.max_inflight_fetches = cli.max_inflight_fetches;
    config.fetch.timeout = Duration::from_secs(cli.fetch_timeout_secs);
    config.fetch.retry.max_retries = cli.fetch_retries;
    config.images.enabled = !cli.no_images;
    config.images.keep_record_on_failure = cli.keep_record_on_image_failure;
    config
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookplate=info,warn"),
            1 => EnvFilter::new("bookplate=debug,info"),
            2 => EnvFilter::new("bookplate=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
