//! Bookplate: a concurrent catalog scraper
//!
//! This crate extracts structured product records from a paginated,
//! hierarchical catalog site and persists them one CSV table per category,
//! alongside downloaded product images. The pipeline fans out over
//! categories, then over the products within each category, with bounded
//! concurrency at both levels and a serialized writer per category table.

pub mod catalog;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pipeline;

use thiserror::Error;

/// Main error type for Bookplate operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] catalog::DiscoveryError),

    #[error("Listing error: {0}")]
    Listing(#[from] catalog::ListingError),

    #[error("Field parse error: {0}")]
    FieldParse(#[from] extract::FieldParseError),

    #[error("Image write error: {0}")]
    ImageWrite(#[from] output::ImageWriteError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Writer for category '{category}' is closed")]
    WriterClosed { category: String },

    #[error("Writer task failed: {0}")]
    WriterTask(#[from] tokio::task::JoinError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Bookplate operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::ProductRecord;
pub use pipeline::{run, RunReport};
