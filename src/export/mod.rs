//! # CSV Export
//!
//! Writes the projected records to a single CSV file, truncating it first.
//!
//! Fields are written verbatim: no quoting and no escaping. A value holding a
//! comma or a newline shifts the columns of its row, exactly as a plain
//! comma-join would.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::error::ExportError;
use crate::models::ProductRecord;

pub const CSV_HEADER: [&str; 12] = [
    "product_id",
    "name",
    "weight",
    "description",
    "available",
    "brand_name",
    "price",
    "currency",
    "item_category",
    "tax",
    "sku",
    "variant",
];

/// Writes the header and one row per record. Returns the number of rows written.
pub fn write_csv(path: &Path, records: &[ProductRecord]) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Saved {} records to {}", records.len(), path.display());
    Ok(records.len())
}
