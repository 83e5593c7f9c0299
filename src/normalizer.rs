// 🧭 Record Normalizer
//
// Maps one raw tabular row (arbitrary column-name casing/spelling) into the
// canonical record shape. Pure and total: every missing field resolves to
// its documented default, there is no error path.

use std::collections::HashMap;

use crate::store::{Origin, Record};

/// Sentinel name for rows that supply none.
pub const UNKNOWN_NAME: &str = "Unknown Item";

/// Sentinel region; a record's region is never empty.
pub const UNKNOWN_REGION: &str = "Unknown";

// Accepted column names per canonical field, in priority order.
// Headers are matched case-insensitively after trimming.
const NAME_COLUMNS: &[&str] = &["Item Name", "name"];
const REGION_COLUMNS: &[&str] = &["Region", "region"];
const LORE_COLUMNS: &[&str] = &["Lore", "lore"];
const DESCRIPTION_COLUMNS: &[&str] = &["DescriptionLore", "descriptionLore"];
const IMAGE_COLUMNS: &[&str] = &["ImageURL", "image"];

/// Normalize one raw row into a canonical [`Record`].
///
/// The record id is derived deterministically from `(source_id, row_index)`,
/// so re-deriving from the same source and row yields the same id.
pub fn normalize_row(
    row: &HashMap<String, String>,
    source_id: &str,
    row_index: usize,
) -> Record {
    Record {
        id: format!("{}-{}", source_id, row_index),
        name: field(row, NAME_COLUMNS).unwrap_or(UNKNOWN_NAME).to_string(),
        region: normalize_region(field(row, REGION_COLUMNS).unwrap_or("")),
        lore: field(row, LORE_COLUMNS).unwrap_or("").to_string(),
        description_lore: field(row, DESCRIPTION_COLUMNS).unwrap_or("").to_string(),
        image: field(row, IMAGE_COLUMNS).unwrap_or("").to_string(),
        source_id: source_id.to_string(),
        origin: Origin::Csv,
    }
}

/// Region normalization: empty collapses to the sentinel, everything else
/// is title-cased. All other text fields pass through verbatim.
pub fn normalize_region(raw: &str) -> String {
    if raw.is_empty() {
        UNKNOWN_REGION.to_string()
    } else {
        title_case(raw)
    }
}

/// Capitalize the first letter of each space-delimited word. The rest of
/// each word is left untouched, which makes the transform idempotent.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First alternate that is present with a non-empty value wins.
fn field<'a>(row: &'a HashMap<String, String>, alternates: &[&str]) -> Option<&'a str> {
    for alternate in alternates {
        let hit = row
            .iter()
            .find(|(key, value)| key.trim().eq_ignore_ascii_case(alternate) && !value.is_empty());
        if let Some((_, value)) = hit {
            return Some(value.as_str());
        }
    }
    None
}
