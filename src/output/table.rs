//! Per-category CSV table writer
//!
//! Many product workers finish concurrently, but each category's table is
//! an order-sensitive shared resource. Appends are therefore funneled
//! through a single-owner actor task that holds the only handle to the
//! file; the bounded channel in front of it makes backpressure explicit if
//! the sink is slow.

use crate::extract::ProductRecord;
use crate::{Result, ScrapeError};
use std::fs::File;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Queue depth in front of the writer task
const WRITER_QUEUE: usize = 32;

/// Serialized sink appending records to one category's table
pub struct CategoryWriter {
    category: String,
    tx: mpsc::Sender<ProductRecord>,
    handle: JoinHandle<std::result::Result<u64, csv::Error>>,
}

impl CategoryWriter {
    /// Creates the category's table and writes its header row
    ///
    /// The header is flushed immediately so it is present even for a
    /// category that ends up with zero rows.
    pub fn create(target_dir: &Path, category: &str) -> Result<Self> {
        let path = target_dir.join(format!("{}.csv", category));
        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(ProductRecord::COLUMNS)?;
        writer.flush().map_err(csv::Error::from)?;

        let (tx, rx) = mpsc::channel(WRITER_QUEUE);
        let handle = tokio::spawn(drain(writer, rx));

        tracing::debug!("Opened table {}", path.display());
        Ok(Self {
            category: category.to_string(),
            tx,
            handle,
        })
    }

    /// Appends one record to the table
    ///
    /// Fails only when the writer task has already stopped (after an I/O
    /// error); the underlying cause is reported by `close`.
    pub async fn append(&self, record: ProductRecord) -> Result<()> {
        self.tx
            .send(record)
            .await
            .map_err(|_| ScrapeError::WriterClosed {
                category: self.category.clone(),
            })
    }

    /// Flushes and closes the table, returning the number of rows written
    pub async fn close(self) -> Result<u64> {
        drop(self.tx);
        let rows = self.handle.await??;
        Ok(rows)
    }
}

/// Writer task body: owns the CSV writer, drains the queue
async fn drain(
    mut writer: csv::Writer<File>,
    mut rx: mpsc::Receiver<ProductRecord>,
) -> std::result::Result<u64, csv::Error> {
    let mut rows = 0u64;
    while let Some(record) = rx.recv().await {
        writer.serialize(&record)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(n: u32) -> ProductRecord {
        ProductRecord {
            upc: format!("upc-{:04}", n),
            price_excl_tax: "£10.00".to_string(),
            price_incl_tax: "£10.00".to_string(),
            available_count: n,
            detail_url: format!("https://example.com/p/{}", n),
            title: format!("Title {}", n),
            description: "a, description with \"quotes\"".to_string(),
            image_url: "https://example.com/i.jpg".to_string(),
            rating: 3,
            category: "Travel".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_table_still_has_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CategoryWriter::create(dir.path(), "Travel").unwrap();
        let rows = writer.close().await.unwrap();
        assert_eq!(rows, 0);

        let content = std::fs::read_to_string(dir.path().join("Travel.csv")).unwrap();
        assert_eq!(content.trim_end(), ProductRecord::COLUMNS.join(","));
    }

    #[tokio::test]
    async fn concurrent_appends_write_every_row_intact() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Arc::new(CategoryWriter::create(dir.path(), "Travel").unwrap());

        let mut handles = Vec::new();
        for n in 0..40 {
            let writer = Arc::clone(&writer);
            handles.push(tokio::spawn(async move {
                writer.append(record(n)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let writer = Arc::try_unwrap(writer).ok().expect("writer still shared");
        let rows = writer.close().await.unwrap();
        assert_eq!(rows, 40);

        // Every row must parse back with all ten fields, in any order
        let mut reader = csv::Reader::from_path(dir.path().join("Travel.csv")).unwrap();
        let mut upcs: Vec<String> = reader
            .records()
            .map(|row| {
                let row = row.unwrap();
                assert_eq!(row.len(), 10);
                row[0].to_string()
            })
            .collect();
        upcs.sort();
        assert_eq!(upcs.len(), 40);
        assert_eq!(upcs[0], "upc-0000");
        assert_eq!(upcs[39], "upc-0039");
    }
}
