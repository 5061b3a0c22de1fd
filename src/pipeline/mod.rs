//! Pipeline orchestration
//!
//! This module drives the whole run:
//! - Fanning out over categories, then over products, with bounded
//!   concurrency at both levels
//! - Per-product workers that fetch, extract, store the image, and hand the
//!   record to the category's writer
//! - Aggregating every non-fatal failure into the final run report

mod orchestrator;
mod report;
mod worker;

pub use orchestrator::{run, Pipeline};
pub use report::{Failure, FailureKind, RunReport};

pub(crate) use report::Recorder;
