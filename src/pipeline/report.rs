//! Run report and failure aggregation

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Classification of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// A detail page or image could not be fetched
    Fetch,

    /// A category's pagination was unreadable; the category was skipped
    Listing,

    /// A required field was missing or unrecognized on a detail page
    FieldParse,

    /// An image could not be named or written
    ImageWrite,

    /// A record could not be appended to its category table
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Listing => "listing",
            FailureKind::FieldParse => "field_parse",
            FailureKind::ImageWrite => "image_write",
            FailureKind::Write => "write",
        };
        write!(f, "{}", name)
    }
}

/// One recorded non-fatal failure
#[derive(Debug, Clone)]
pub struct Failure {
    pub category: String,
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Aggregated outcome of one run
///
/// A run that completes always produces a report, however many failures it
/// carries; only discovery and setup failures abort the run itself.
#[derive(Debug, Default)]
pub struct RunReport {
    pub categories_discovered: usize,
    pub categories_completed: usize,
    pub products_discovered: usize,
    pub products_written: u64,
    pub images_written: u64,
    pub failures: Vec<Failure>,
}

impl RunReport {
    /// Failure counts grouped by kind, in stable order
    pub fn failures_by_kind(&self) -> BTreeMap<FailureKind, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Logs the end-of-run summary
    pub fn log_summary(&self, elapsed: Duration) {
        tracing::info!("Run finished in {:.1}s", elapsed.as_secs_f64());
        tracing::info!(
            "Categories: {}/{} completed",
            self.categories_completed,
            self.categories_discovered
        );
        tracing::info!(
            "Products: {} written of {} discovered",
            self.products_written,
            self.products_discovered
        );
        tracing::info!("Images: {} written", self.images_written);

        if self.failures.is_empty() {
            tracing::info!("No failures recorded");
        } else {
            tracing::warn!("{} failures recorded:", self.failures.len());
            for (kind, count) in self.failures_by_kind() {
                tracing::warn!("  {}: {}", kind, count);
            }
        }
    }
}

/// Shared collector the workers report into while the run is in flight
///
/// Every failure is logged the moment it is recorded; a dropped record is
/// never silent.
pub(crate) struct Recorder {
    inner: Mutex<RunReport>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RunReport::default()),
        }
    }

    pub fn failure(&self, category: &str, url: &str, kind: FailureKind, message: impl fmt::Display) {
        let message = message.to_string();
        tracing::warn!(
            "[{}] {} failure for {}: {}",
            category,
            kind,
            url,
            message
        );
        self.inner.lock().unwrap().failures.push(Failure {
            category: category.to_string(),
            url: url.to_string(),
            kind,
            message,
        });
    }

    pub fn categories_discovered(&self, count: usize) {
        self.inner.lock().unwrap().categories_discovered = count;
    }

    pub fn products_discovered(&self, count: usize) {
        self.inner.lock().unwrap().products_discovered += count;
    }

    pub fn product_written(&self) {
        self.inner.lock().unwrap().products_written += 1;
    }

    pub fn image_written(&self) {
        self.inner.lock().unwrap().images_written += 1;
    }

    pub fn category_completed(&self) {
        self.inner.lock().unwrap().categories_completed += 1;
    }

    pub fn into_report(self) -> RunReport {
        self.inner.into_inner().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_group_by_kind() {
        let recorder = Recorder::new();
        recorder.failure("Travel", "http://a", FailureKind::Fetch, "404");
        recorder.failure("Travel", "http://b", FailureKind::Fetch, "timeout");
        recorder.failure("Mystery", "http://c", FailureKind::FieldParse, "no upc");

        let report = recorder.into_report();
        let by_kind = report.failures_by_kind();
        assert_eq!(by_kind.get(&FailureKind::Fetch), Some(&2));
        assert_eq!(by_kind.get(&FailureKind::FieldParse), Some(&1));
        assert_eq!(report.failures.len(), 3);
    }

    #[test]
    fn failure_kinds_display_as_snake_case() {
        assert_eq!(FailureKind::Fetch.to_string(), "fetch");
        assert_eq!(FailureKind::FieldParse.to_string(), "field_parse");
        assert_eq!(FailureKind::ImageWrite.to_string(), "image_write");
    }
}
