// Delimited-text codec shared by the import and export pipelines.
//
// Thin wrapper over the csv crate: rows come back as string-keyed maps
// (header cell -> field value) and every parser failure is reported as a
// value, never a panic, so callers can abort a batch with a message.

use std::collections::HashMap;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{CatalogError, Result};

/// Parse delimited text into one map per row.
///
/// With `has_headers` the first row names the columns; without it, columns
/// are keyed by their zero-based index. Blank lines are skipped. A ragged
/// row (wrong field count) fails the whole parse: the caller merges all
/// rows of a successful parse, or none.
pub fn parse_delimited(
    text: &str,
    delimiter: u8,
    has_headers: bool,
) -> Result<Vec<HashMap<String, String>>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = if has_headers {
        reader
            .headers()
            .map_err(|err| CatalogError::Parse(err.to_string()))?
            .iter()
            .map(|cell| cell.trim().to_string())
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| CatalogError::Parse(err.to_string()))?;

        let mut row = HashMap::with_capacity(record.len());
        for (index, value) in record.iter().enumerate() {
            let key = headers
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string());
            row.insert(key, value.to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Serialize rows back into comma-delimited text, header row first.
///
/// `columns` fixes both the header names and the cell order; a row that
/// lacks a column serializes it as empty.
pub fn serialize_delimited(rows: &[HashMap<String, String>], columns: &[&str]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|err| CatalogError::Internal(err.to_string()))?;

    for row in rows {
        let cells: Vec<&str> = columns
            .iter()
            .map(|column| row.get(*column).map(String::as_str).unwrap_or(""))
            .collect();
        writer
            .write_record(&cells)
            .map_err(|err| CatalogError::Internal(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CatalogError::Internal(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| CatalogError::Internal(err.to_string()))
}
