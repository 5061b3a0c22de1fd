//! Output sinks for the scrape pipeline
//!
//! Two sinks exist per run: one CSV table per category, fed through a
//! serialized writer actor, and a shared images directory whose write
//! targets are disjoint by the `(category, upc)` invariant.

mod images;
mod table;

pub use images::{image_filename, ImageStore, ImageWriteError};
pub use table::CategoryWriter;
