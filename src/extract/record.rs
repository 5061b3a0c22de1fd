use serde::Serialize;

/// One extracted product, written as one CSV row
///
/// Field order matches the output column order; the serde renames carry the
/// table's header names. A record is only ever constructed fully populated
/// (or with explicitly empty description), never partially.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    #[serde(rename = "universal_product_code")]
    pub upc: String,

    /// Displayed currency string, kept unparsed for downstream consumers
    #[serde(rename = "price_excluding_tax")]
    pub price_excl_tax: String,

    #[serde(rename = "price_including_tax")]
    pub price_incl_tax: String,

    #[serde(rename = "number_available")]
    pub available_count: u32,

    #[serde(rename = "product_page_url")]
    pub detail_url: String,

    pub title: String,

    /// May legitimately be empty; some products carry no description
    pub description: String,

    pub image_url: String,

    #[serde(rename = "review_rating")]
    pub rating: u8,

    pub category: String,
}

impl ProductRecord {
    /// Output column names, in table order
    pub const COLUMNS: [&'static str; 10] = [
        "universal_product_code",
        "price_excluding_tax",
        "price_including_tax",
        "number_available",
        "product_page_url",
        "title",
        "description",
        "image_url",
        "review_rating",
        "category",
    ];
}
