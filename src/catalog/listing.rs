//! Paginated listing traversal for one category

use crate::catalog::{selector, strip_parent_refs, Category};
use crate::config::RetryPolicy;
use crate::fetch::{with_retry, FetchError, PageFetcher};
use scraper::Html;
use thiserror::Error;

/// Errors raised while walking a category's listing pages
///
/// A listing failure aborts the category: URLs collected from earlier pages
/// are discarded so no partial category is ever processed.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Failed to fetch listing page {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Product links and pagination control extracted from one listing page
#[derive(Debug, PartialEq, Eq)]
struct ListingPage {
    product_urls: Vec<String>,
    next_href: Option<String>,
}

/// Walks a category's pagination and collects every product detail URL
///
/// Traversal terminates when a page carries no "next" control. The order of
/// the produced list follows page order and card order within each page,
/// which keeps it deterministic even though downstream processing does not
/// depend on it.
pub async fn collect_product_urls(
    fetcher: &PageFetcher,
    retry: &RetryPolicy,
    category: &Category,
    base_url: &str,
) -> Result<Vec<String>, ListingError> {
    let mut product_urls = Vec::new();
    let mut page_url = category.listing_url.clone();

    loop {
        let body = with_retry(retry, || fetcher.fetch_text(&page_url))
            .await
            .map_err(|source| ListingError::Fetch {
                url: page_url.clone(),
                source,
            })?;

        let page = parse_listing_page(&body, base_url);
        tracing::debug!(
            "Listing page {} carries {} products",
            page_url,
            page.product_urls.len()
        );
        product_urls.extend(page.product_urls);

        match page.next_href {
            // The next URL hangs off the category's first-page URL, not the
            // current page URL. That is how the site constructs its links;
            // resolving against the current page would double the page path.
            Some(href) => page_url = next_page_url(&category.listing_url, &href),
            None => break,
        }
    }

    Ok(product_urls)
}

/// Extracts product detail URLs and the "next" control from listing HTML
fn parse_listing_page(html: &str, base_url: &str) -> ListingPage {
    let document = Html::parse_document(html);
    let card = selector("article.product_pod h3 a");
    let next = selector(".next a");

    let product_urls = document
        .select(&card)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(|href| product_url(base_url, href))
        .collect();

    let next_href = document
        .select(&next)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string);

    ListingPage {
        product_urls,
        next_href,
    }
}

/// Resolves a product card href against the catalog root
fn product_url(base_url: &str, href: &str) -> String {
    format!("{}/catalogue/{}", base_url, strip_parent_refs(href))
}

/// Computes the next listing page URL from the category base URL
fn next_page_url(listing_url: &str, next_href: &str) -> String {
    format!("{}/{}", listing_url, next_href)
}
