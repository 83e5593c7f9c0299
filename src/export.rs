// Export Pipeline - the full collection back out as delimited text.

use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::store::{CatalogStore, Record};
use crate::tabular::serialize_delimited;

/// Canonical column set, in export order.
pub const EXPORT_COLUMNS: [&str; 5] =
    ["Item Name", "Region", "Lore", "DescriptionLore", "ImageURL"];

/// Serialize every current record (csv-origin and manual alike) in the
/// store's insertion order, header row included. Export always covers the
/// full collection, never a filtered view. An empty collection is refused.
pub fn export_csv(store: &CatalogStore) -> Result<String> {
    if store.is_empty() {
        return Err(CatalogError::Validation("no items to export".to_string()));
    }

    let rows: Vec<HashMap<String, String>> =
        store.records().iter().map(record_to_row).collect();
    serialize_delimited(&rows, &EXPORT_COLUMNS)
}

fn record_to_row(record: &Record) -> HashMap<String, String> {
    let mut row = HashMap::with_capacity(EXPORT_COLUMNS.len());
    row.insert("Item Name".to_string(), record.name.clone());
    row.insert("Region".to_string(), record.region.clone());
    row.insert("Lore".to_string(), record.lore.clone());
    row.insert("DescriptionLore".to_string(), record.description_lore.clone());
    row.insert("ImageURL".to_string(), record.image.clone());
    row
}
