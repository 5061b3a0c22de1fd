//! Detail-page field extraction

use crate::catalog::{selector, strip_parent_refs};
use crate::extract::ProductRecord;
use scraper::{ElementRef, Html};
use thiserror::Error;

/// Errors raised while extracting one product's fields
///
/// These abort the affected product only, never its category.
#[derive(Debug, Error)]
pub enum FieldParseError {
    #[error("Missing required field '{field}' for {url}")]
    MissingField { url: String, field: &'static str },

    #[error("No digits in availability text '{text}' for {url}")]
    Availability { url: String, text: String },

    #[error("Unrecognized rating word '{word}' for {url}")]
    Rating { url: String, word: String },
}

/// Extracts a full `ProductRecord` from detail-page HTML
///
/// The category name is threaded through from discovery rather than
/// re-derived from the page breadcrumb, which may be absent on degraded
/// pages. Prices stay as displayed currency strings; only the availability
/// count and the rating are converted to numbers.
pub fn extract_product(
    html: &str,
    detail_url: &str,
    category: &str,
    base_url: &str,
) -> Result<ProductRecord, FieldParseError> {
    let document = Html::parse_document(html);

    let mut upc = None;
    let mut price_excl_tax = None;
    let mut price_incl_tax = None;
    let mut availability = None;

    let row_sel = selector(".product_page .table tr");
    let th_sel = selector("th");
    let td_sel = selector("td");
    for row in document.select(&row_sel) {
        let label = match row.select(&th_sel).next() {
            Some(th) => text_of(&th),
            None => continue,
        };
        let value = match row.select(&td_sel).next() {
            Some(td) => text_of(&td),
            None => continue,
        };
        match label.as_str() {
            "UPC" => upc = Some(value),
            "Price (excl. tax)" => price_excl_tax = Some(value),
            "Price (incl. tax)" => price_incl_tax = Some(value),
            "Availability" => availability = Some(value),
            _ => {}
        }
    }

    let upc = upc.ok_or_else(|| missing(detail_url, "upc"))?;
    let price_excl_tax = price_excl_tax.ok_or_else(|| missing(detail_url, "price_excl_tax"))?;
    let price_incl_tax = price_incl_tax.ok_or_else(|| missing(detail_url, "price_incl_tax"))?;
    let availability = availability.ok_or_else(|| missing(detail_url, "availability"))?;

    let available_count =
        first_digit_run(&availability).ok_or_else(|| FieldParseError::Availability {
            url: detail_url.to_string(),
            text: availability.clone(),
        })?;

    let title = document
        .select(&selector("h1"))
        .next()
        .map(|h1| text_of(&h1))
        .ok_or_else(|| missing(detail_url, "title"))?;

    // Some products legitimately carry no description paragraph.
    let description = document
        .select(&selector("#product_description + p"))
        .next()
        .map(|p| text_of(&p))
        .unwrap_or_default();

    let image_src = document
        .select(&selector(".thumbnail img"))
        .next()
        .and_then(|img| img.value().attr("src").map(str::to_string))
        .ok_or_else(|| missing(detail_url, "image_url"))?;
    let image_url = format!("{}/{}", base_url, strip_parent_refs(&image_src));

    let star = document
        .select(&selector(".star-rating"))
        .next()
        .ok_or_else(|| missing(detail_url, "rating"))?;
    let word = star
        .value()
        .classes()
        .find(|class| *class != "star-rating")
        .ok_or_else(|| missing(detail_url, "rating"))?;
    let rating = rating_from_word(word).ok_or_else(|| FieldParseError::Rating {
        url: detail_url.to_string(),
        word: word.to_string(),
    })?;

    Ok(ProductRecord {
        upc,
        price_excl_tax,
        price_incl_tax,
        available_count,
        detail_url: detail_url.to_string(),
        title,
        description,
        image_url,
        rating,
        category: category.to_string(),
    })
}

fn missing(url: &str, field: &'static str) -> FieldParseError {
    FieldParseError::MissingField {
        url: url.to_string(),
        field,
    }
}

/// Collects an element's text content, whitespace-trimmed
fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses the first maximal run of ASCII digits anywhere in the text
fn first_digit_run(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Maps the five-valued rating word to its integer
fn rating_from_word(word: &str) -> Option<u8> {
    match word {
        "One" => Some(1),
        "Two" => Some(2),
        "Three" => Some(3),
        "Four" => Some(4),
        "Five" => Some(5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://books.toscrape.com";
    const URL: &str = "https://books.toscrape.com/catalogue/its-only-the-himalayas_981/index.html";

    fn detail_html(rating: &str, description: Option<&str>) -> String {
        let description_block = match description {
            Some(text) => format!(
                r#"<div id="product_description" class="sub-header"><h2>Product Description</h2></div>
                <p>{}</p>"#,
                text
            ),
            None => String::new(),
        };
        format!(
            r#"<html><body><article class="product_page">
            <div class="thumbnail">
              <img src="../../media/cache/27/a5/27a53d0bb95bdd88288eaf66c9230d7e.jpg"/>
            </div>
            <p class="star-rating {rating}"></p>
            <h1>It's Only the Himalayas</h1>
            {description_block}
            <table class="table table-striped">
              <tr><th>UPC</th><td>a22124811bfa8350</td></tr>
              <tr><th>Product Type</th><td>Books</td></tr>
              <tr><th>Price (excl. tax)</th><td>£45.17</td></tr>
              <tr><th>Price (incl. tax)</th><td>£45.17</td></tr>
              <tr><th>Tax</th><td>£0.00</td></tr>
              <tr><th>Availability</th><td>In stock (19 available)</td></tr>
            </table>
            </article></body></html>"#
        )
    }

    #[test]
    fn extracts_all_fields() {
        let html = detail_html("Two", Some("A gentle trek account."));
        let record = extract_product(&html, URL, "Travel", BASE).unwrap();

        assert_eq!(record.upc, "a22124811bfa8350");
        assert_eq!(record.price_excl_tax, "£45.17");
        assert_eq!(record.price_incl_tax, "£45.17");
        assert_eq!(record.available_count, 19);
        assert_eq!(record.detail_url, URL);
        assert_eq!(record.title, "It's Only the Himalayas");
        assert_eq!(record.description, "A gentle trek account.");
        assert_eq!(
            record.image_url,
            format!(
                "{}/media/cache/27/a5/27a53d0bb95bdd88288eaf66c9230d7e.jpg",
                BASE
            )
        );
        assert_eq!(record.rating, 2);
        assert_eq!(record.category, "Travel");
    }

    #[test]
    fn missing_description_is_empty_not_an_error() {
        let html = detail_html("Five", None);
        let record = extract_product(&html, URL, "Travel", BASE).unwrap();
        assert_eq!(record.description, "");
    }

    #[test]
    fn rating_words_map_bijectively() {
        for (word, value) in [("One", 1), ("Two", 2), ("Three", 3), ("Four", 4), ("Five", 5)] {
            assert_eq!(rating_from_word(word), Some(value));
        }
        assert_eq!(rating_from_word("Six"), None);
        assert_eq!(rating_from_word("one"), None);
    }

    #[test]
    fn unrecognized_rating_word_fails_the_product() {
        let html = detail_html("Zero", Some("d"));
        match extract_product(&html, URL, "Travel", BASE) {
            Err(FieldParseError::Rating { word, .. }) => assert_eq!(word, "Zero"),
            other => panic!("expected rating error, got {:?}", other),
        }
    }

    #[test]
    fn missing_upc_fails_the_product() {
        let html = detail_html("One", Some("d")).replace("UPC", "SKU");
        match extract_product(&html, URL, "Travel", BASE) {
            Err(FieldParseError::MissingField { field, .. }) => assert_eq!(field, "upc"),
            other => panic!("expected missing field error, got {:?}", other),
        }
    }

    #[test]
    fn availability_without_digits_fails_the_product() {
        let html = detail_html("One", Some("d")).replace("In stock (19 available)", "In stock");
        match extract_product(&html, URL, "Travel", BASE) {
            Err(FieldParseError::Availability { text, .. }) => assert_eq!(text, "In stock"),
            other => panic!("expected availability error, got {:?}", other),
        }
    }

    #[test]
    fn first_digit_run_takes_the_first_maximal_run() {
        assert_eq!(first_digit_run("In stock (22 available)"), Some(22));
        assert_eq!(first_digit_run("In stock (1 available)"), Some(1));
        assert_eq!(first_digit_run("12 of 34"), Some(12));
        assert_eq!(first_digit_run("out of stock"), None);
    }
}
