//! Per-product worker
//!
//! One worker run covers the whole lifecycle of a single product URL:
//! fetch the detail page, extract the record, fetch and store the image,
//! hand the record to the category writer. Failures are recorded and stay
//! confined to the product; sibling workers never see them.

use crate::catalog::Category;
use crate::config::Config;
use crate::extract::{extract_product, ProductRecord};
use crate::fetch::{with_retry, PageFetcher};
use crate::output::{CategoryWriter, ImageStore};
use crate::pipeline::{FailureKind, Recorder};

/// Borrowed environment shared by all workers of one category
pub(crate) struct ProductContext<'a> {
    pub config: &'a Config,
    pub fetcher: &'a PageFetcher,
    pub images: &'a ImageStore,
    pub writer: &'a CategoryWriter,
    pub recorder: &'a Recorder,
    pub category: &'a Category,
}

/// Processes one product URL end to end
pub(crate) async fn process_product(ctx: &ProductContext<'_>, url: &str) {
    let retry = &ctx.config.fetch.retry;

    let body = match with_retry(retry, || ctx.fetcher.fetch_text(url)).await {
        Ok(body) => body,
        Err(err) => {
            ctx.recorder
                .failure(&ctx.category.name, url, FailureKind::Fetch, err);
            return;
        }
    };

    let record = match extract_product(&body, url, &ctx.category.name, &ctx.config.base_url) {
        Ok(record) => record,
        Err(err) => {
            ctx.recorder
                .failure(&ctx.category.name, url, FailureKind::FieldParse, err);
            return;
        }
    };

    if ctx.config.images.enabled {
        match store_image(ctx, &record).await {
            Ok(()) => ctx.recorder.image_written(),
            Err((kind, message)) => {
                ctx.recorder.failure(&ctx.category.name, url, kind, message);
                if !ctx.config.images.keep_record_on_failure {
                    return;
                }
            }
        }
    }

    match ctx.writer.append(record).await {
        Ok(()) => ctx.recorder.product_written(),
        Err(err) => {
            ctx.recorder
                .failure(&ctx.category.name, url, FailureKind::Write, err);
        }
    }
}

/// Fetches the product image and writes it through the store
async fn store_image(
    ctx: &ProductContext<'_>,
    record: &ProductRecord,
) -> Result<(), (FailureKind, String)> {
    let retry = &ctx.config.fetch.retry;

    let (bytes, content_type) = with_retry(retry, || ctx.fetcher.fetch_bytes(&record.image_url))
        .await
        .map_err(|err| (FailureKind::Fetch, err.to_string()))?;

    ctx.images
        .save(&record.category, &record.upc, &content_type, &bytes)
        .await
        .map_err(|err| (FailureKind::ImageWrite, err.to_string()))?;

    Ok(())
}
