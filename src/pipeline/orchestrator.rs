//! Top-level run driver

use crate::catalog::{collect_product_urls, discover_categories, Category};
use crate::config::{self, Config};
use crate::fetch::PageFetcher;
use crate::output::{CategoryWriter, ImageStore};
use crate::pipeline::worker::{process_product, ProductContext};
use crate::pipeline::{FailureKind, Recorder, RunReport};
use crate::Result;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Drives one complete scrape run
///
/// Categories fan out under one bound, the products of each category under
/// another, and the fetcher caps total in-flight requests globally.
/// Everything past discovery is non-fatal: failures land in the report and
/// the run keeps going.
pub struct Pipeline {
    config: Config,
    fetcher: PageFetcher,
    images: ImageStore,
    recorder: Recorder,
    completed: AtomicUsize,
}

impl Pipeline {
    /// Validates the configuration and prepares the output directories
    ///
    /// Failures here are fatal setup failures: an uncreatable target
    /// directory aborts the run before anything is fetched.
    pub async fn new(config: Config) -> Result<Self> {
        config::validate(&config)?;
        tokio::fs::create_dir_all(&config.target_dir).await?;
        let images = ImageStore::create(&config.target_dir).await?;
        let fetcher = PageFetcher::new(&config)?;

        Ok(Self {
            config,
            fetcher,
            images,
            recorder: Recorder::new(),
            completed: AtomicUsize::new(0),
        })
    }

    /// Runs the scrape to completion and returns the aggregated report
    ///
    /// Only discovery failure aborts the run; an unreachable home page or a
    /// missing navigation structure means no categories exist to process.
    pub async fn run(self) -> Result<RunReport> {
        let started = Instant::now();

        let categories = discover_categories(
            &self.fetcher,
            &self.config.fetch.retry,
            &self.config.base_url,
        )
        .await?;
        let total = categories.len();
        tracing::info!("Discovered {} categories", total);
        self.recorder.categories_discovered(total);

        stream::iter(&categories)
            .for_each_concurrent(self.config.limits.max_category_workers, |category| {
                self.process_category(total, category)
            })
            .await;

        let report = self.recorder.into_report();
        report.log_summary(started.elapsed());
        Ok(report)
    }

    /// Processes one category: list, fan out workers, close the table
    async fn process_category(&self, total: usize, category: &Category) {
        tracing::info!("Listing category '{}'", category.name);

        let urls = match collect_product_urls(
            &self.fetcher,
            &self.config.fetch.retry,
            category,
            &self.config.base_url,
        )
        .await
        {
            Ok(urls) => urls,
            Err(err) => {
                // Partial URL sets from earlier pages are discarded with the
                // category; a half-listed category is never processed.
                self.recorder.failure(
                    &category.name,
                    &category.listing_url,
                    FailureKind::Listing,
                    err,
                );
                return;
            }
        };
        self.recorder.products_discovered(urls.len());

        let writer = match CategoryWriter::create(&self.config.target_dir, &category.name) {
            Ok(writer) => writer,
            Err(err) => {
                self.recorder.failure(
                    &category.name,
                    &category.listing_url,
                    FailureKind::Write,
                    err,
                );
                return;
            }
        };

        let ctx = ProductContext {
            config: &self.config,
            fetcher: &self.fetcher,
            images: &self.images,
            writer: &writer,
            recorder: &self.recorder,
            category,
        };
        stream::iter(&urls)
            .for_each_concurrent(self.config.limits.max_product_workers, |url| {
                process_product(&ctx, url)
            })
            .await;

        match writer.close().await {
            Ok(rows) => {
                let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::info!(
                    "[{}/{}] Category '{}' complete: {} rows from {} products",
                    done,
                    total,
                    category.name,
                    rows,
                    urls.len()
                );
                self.recorder.category_completed();
            }
            Err(err) => {
                self.recorder.failure(
                    &category.name,
                    &category.listing_url,
                    FailureKind::Write,
                    err,
                );
            }
        }
    }
}

/// Runs a complete scrape with the given configuration
///
/// This is the main library entry point: it builds the pipeline, drives it
/// to completion, and returns the run report.
///
/// # Example
///
/// ```no_run
/// use bookplate::config::Config;
///
/// # async fn demo() -> bookplate::Result<()> {
/// let config = Config::new("output");
/// let report = bookplate::pipeline::run(config).await?;
/// println!("{} products written", report.products_written);
/// # Ok(())
/// # }
/// ```
pub async fn run(config: Config) -> Result<RunReport> {
    Pipeline::new(config).await?.run().await
}
