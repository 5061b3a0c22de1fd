//! Field extraction from product detail pages
//!
//! Given a fetched detail document, this module produces one fully
//! populated `ProductRecord`. Any required field that cannot be extracted
//! fails the product (and only the product) with a `FieldParseError`; the
//! description is the single optional field.

mod product;
mod record;

pub use product::{extract_product, FieldParseError};
pub use record::ProductRecord;
