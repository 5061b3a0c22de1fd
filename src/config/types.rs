use std::path::PathBuf;
use std::time::Duration;

/// Catalog root scraped when no other URL is given
pub const DEFAULT_BASE_URL: &str = "https://books.toscrape.com";

/// Main configuration structure for Bookplate
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog root URL, without a trailing slash
    pub base_url: String,

    /// Directory receiving the per-category CSV tables and the images
    /// subdirectory
    pub target_dir: PathBuf,

    pub limits: LimitsConfig,
    pub fetch: FetchConfig,
    pub images: ImageConfig,
}

/// Concurrency bounds for the pipeline
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum number of categories processed concurrently
    pub max_category_workers: usize,

    /// Maximum number of products processed concurrently within one category
    pub max_product_workers: usize,

    /// Global cap on simultaneous in-flight HTTP requests
    pub max_inflight_fetches: usize,
}

/// HTTP fetch behavior
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// User agent string sent with every request
    pub user_agent: String,

    /// Retry policy applied by callers to failed fetches
    pub retry: RetryPolicy,
}

/// Image pipeline behavior
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Whether product images are downloaded at all
    pub enabled: bool,

    /// Write the CSV row even when the image step failed for the product
    pub keep_record_on_failure: bool,
}

/// Bounded retry with backoff, applied to fetch errors only
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt; 0 disables retrying
    pub max_retries: u32,

    /// Base delay, doubled on each subsequent attempt
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before the given retry attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Creates a configuration with defaults for everything but the target
    /// directory
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            target_dir: target_dir.into(),
            limits: LimitsConfig {
                max_category_workers: 4,
                max_product_workers: 8,
                max_inflight_fetches: 16,
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(30),
                connect_timeout: Duration::from_secs(10),
                user_agent: format!("bookplate/{}", env!("CARGO_PKG_VERSION")),
                retry: RetryPolicy::default(),
            },
            images: ImageConfig {
                enabled: true,
                keep_record_on_failure: false,
            },
        }
    }
}
