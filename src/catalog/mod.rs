//! Catalog traversal for the fixed site topology
//!
//! This module walks the three page shapes the pipeline understands:
//! - The home page, whose sidebar enumerates the categories
//! - Paginated category listing pages, which link the product detail pages
//!
//! Detail pages themselves are handled by the `extract` module.

mod categories;
mod listing;

pub use categories::{discover_categories, Category, DiscoveryError};
pub use listing::{collect_product_urls, ListingError};

use scraper::Selector;

/// Parses a CSS selector known at compile time
///
/// Selector strings in this crate are literals; a parse failure is a
/// programmer error, not a runtime condition.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid static selector")
}

/// Strips leading `../` segments from a site-relative href
///
/// Catalog pages link products and media relative to their own nesting
/// depth; the remainder is always a path under the catalog root.
pub(crate) fn strip_parent_refs(href: &str) -> &str {
    let mut rest = href;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_repeated_parent_refs() {
        assert_eq!(
            strip_parent_refs("../../../its-only-the-himalayas_981/index.html"),
            "its-only-the-himalayas_981/index.html"
        );
        assert_eq!(strip_parent_refs("page-2.html"), "page-2.html");
        assert_eq!(strip_parent_refs("../media/cover.jpg"), "media/cover.jpg");
    }
}
