//! HTTP fetching for the scrape pipeline
//!
//! This module contains the transport layer:
//! - Building the shared HTTP client with user agent and timeouts
//! - Fetching pages as text and images as raw bytes
//! - Normalizing transport and status failures into `FetchError`
//! - A caller-side bounded retry helper (the fetcher itself never retries)

mod client;
mod page;

pub use client::build_http_client;
pub use page::{with_retry, FetchError, PageFetcher};
