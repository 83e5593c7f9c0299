// Import Pipeline - parse, normalize, merge, save.
//
// Two entry points share one core path: the bootstrap load of the default
// source and the user-supplied file upload. Either all rows of a
// successful parse are merged, or none are; after a merge the state is
// saved and the caller re-runs the (pure) query and region projections.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{CatalogError, Result};
use crate::persistence::{self, StateStore};
use crate::store::{CatalogStore, SourceBatch};
use crate::tabular::parse_delimited;

/// Well-known default source, loaded on first start.
/// Ships as a semicolon-delimited table; uploads are comma-delimited.
pub const DEFAULT_SOURCE_FILE: &str = "base-items.csv";

const BOOTSTRAP_DELIMITER: u8 = b';';
const UPLOAD_DELIMITER: u8 = b',';

/// What the bootstrap attempt produced. `NoData` is an empty initial
/// state with a display message, not an error.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// The default source was parsed and merged.
    Loaded(SourceBatch),
    /// A prior session was restored (or data already exists); the default
    /// source is not loaded again.
    AlreadyPopulated,
    /// The default source was unavailable or unparsable; the store stays
    /// empty and the UI shows its "no data" state.
    NoData(String),
}

/// Bootstrap load of the default source at `path`.
///
/// Fetch or parse failures are not fatal: the catalog simply starts empty.
pub fn bootstrap(
    store: &mut CatalogStore,
    state: &mut dyn StateStore,
    path: &Path,
) -> BootstrapOutcome {
    if !store.is_empty() || !store.batches().is_empty() {
        return BootstrapOutcome::AlreadyPopulated;
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            let err = CatalogError::Fetch(err);
            info!("default source {} unavailable: {}", path.display(), err);
            return BootstrapOutcome::NoData(err.to_string());
        }
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_SOURCE_FILE);

    match merge_text(store, state, file_name, &text, BOOTSTRAP_DELIMITER) {
        Ok(batch) => BootstrapOutcome::Loaded(batch),
        Err(err) => {
            info!("default source {} rejected: {}", file_name, err);
            BootstrapOutcome::NoData(err.to_string())
        }
    }
}

/// Ingest one user-supplied file.
///
/// A file name matching an already-loaded batch is rejected before
/// anything is parsed; a parse failure aborts the batch with no partial
/// ingestion. On success the batch is merged and the state saved.
pub fn import_file(
    store: &mut CatalogStore,
    state: &mut dyn StateStore,
    file_name: &str,
    text: &str,
) -> Result<SourceBatch> {
    if store.has_source_file(file_name) {
        return Err(CatalogError::DuplicateSource {
            file_name: file_name.to_string(),
        });
    }

    merge_text(store, state, file_name, text, UPLOAD_DELIMITER)
}

fn merge_text(
    store: &mut CatalogStore,
    state: &mut dyn StateStore,
    file_name: &str,
    text: &str,
    delimiter: u8,
) -> Result<SourceBatch> {
    let rows = parse_delimited(text, delimiter, true)?;
    let batch = store.merge_batch(&rows, file_name)?;
    persistence::save(store, state)?;

    info!(
        "merged {} records from {} (source {})",
        batch.record_count, file_name, batch.source_id
    );
    Ok(batch)
}
