//! Configuration module for Bookplate
//!
//! The configuration is assembled from CLI arguments (there is no config
//! file) and validated before the pipeline starts.

mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, ImageConfig, LimitsConfig, RetryPolicy, DEFAULT_BASE_URL};

// Re-export validation
pub use validation::validate;
