//! Category discovery from the catalog home page

use crate::catalog::selector;
use crate::config::RetryPolicy;
use crate::fetch::{with_retry, FetchError, PageFetcher};
use scraper::Html;
use thiserror::Error;

/// Errors raised while enumerating categories
///
/// Both variants are fatal for the run: without the home page navigation
/// no categories can be processed at all.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch catalog home {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Category navigation missing at {url}")]
    NavigationMissing { url: String },
}

/// A named product grouping with its own paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name as shown in the sidebar navigation
    pub name: String,

    /// Canonical listing URL, with the trailing index document stripped
    pub listing_url: String,
}

/// Fetches the home page and enumerates the sidebar categories
///
/// Categories are produced in document order. Navigation entries are unique
/// per category, so the result carries no duplicates by construction.
///
/// # Arguments
///
/// * `fetcher` - The shared page fetcher
/// * `retry` - Retry policy for the home page fetch
/// * `base_url` - Catalog root URL, without a trailing slash
///
/// # Returns
///
/// * `Ok(Vec<Category>)` - The discovered categories, in document order
/// * `Err(DiscoveryError)` - Home page unreachable or navigation missing;
///   either aborts the run
pub async fn discover_categories(
    fetcher: &PageFetcher,
    retry: &RetryPolicy,
    base_url: &str,
) -> Result<Vec<Category>, DiscoveryError> {
    let body = with_retry(retry, || fetcher.fetch_text(base_url))
        .await
        .map_err(|source| DiscoveryError::Fetch {
            url: base_url.to_string(),
            source,
        })?;

    let categories = parse_categories(&body, base_url);
    if categories.is_empty() {
        return Err(DiscoveryError::NavigationMissing {
            url: base_url.to_string(),
        });
    }

    Ok(categories)
}

/// Extracts the category list from home page HTML
///
/// The sidebar nests the per-category anchors one list below the top-level
/// "all products" entry, so the selector targets the inner `ul` only.
fn parse_categories(html: &str, base_url: &str) -> Vec<Category> {
    let document = Html::parse_document(html);
    let nav = selector(".side_categories .nav-list ul a");

    document
        .select(&nav)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let name = anchor.text().collect::<String>().trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(Category {
                name,
                listing_url: category_base_url(base_url, href),
            })
        })
        .collect()
}

/// Resolves a sidebar href to the category's canonical base URL
///
/// The trailing `index.html` is stripped so pagination hrefs can later be
/// appended to this URL directly.
fn category_base_url(base_url: &str, href: &str) -> String {
    let joined = format!("{}/{}", base_url, href.trim_start_matches('/'));
    joined
        .trim_end_matches("index.html")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://books.toscrape.com";

    fn home_html() -> String {
        r#"<html><body>
        <div class="side_categories">
          <ul class="nav nav-list">
            <li><a href="catalogue/category/books_1/index.html">Books</a>
              <ul>
                <li><a href="catalogue/category/books/travel_2/index.html">
                  Travel
                </a></li>
                <li><a href="catalogue/category/books/mystery_3/index.html">
                  Mystery
                </a></li>
              </ul>
            </li>
          </ul>
        </div>
        </body></html>"#
            .to_string()
    }

    #[test]
    fn parses_categories_in_document_order() {
        let categories = parse_categories(&home_html(), BASE);
        assert_eq!(
            categories,
            vec![
                Category {
                    name: "Travel".to_string(),
                    listing_url: format!("{}/catalogue/category/books/travel_2", BASE),
                },
                Category {
                    name: "Mystery".to_string(),
                    listing_url: format!("{}/catalogue/category/books/mystery_3", BASE),
                },
            ]
        );
    }

    #[test]
    fn skips_top_level_books_entry() {
        let categories = parse_categories(&home_html(), BASE);
        assert!(categories.iter().all(|c| c.name != "Books"));
    }

    #[test]
    fn missing_sidebar_yields_no_categories() {
        let categories = parse_categories("<html><body><p>nope</p></body></html>", BASE);
        assert!(categories.is_empty());
    }

    #[test]
    fn strips_index_document_suffix() {
        assert_eq!(
            category_base_url(BASE, "catalogue/category/books/travel_2/index.html"),
            format!("{}/catalogue/category/books/travel_2", BASE)
        );
    }
}
