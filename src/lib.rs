// Lore Catalog - Core Library
// Exposes the ingestion, query, and persistence modules for the CLI and tests

pub mod command;
pub mod error;
pub mod export;
pub mod import;
pub mod normalizer;
pub mod persistence;
pub mod query;
pub mod store;
pub mod tabular;

// Re-export commonly used types
pub use command::{dispatch, Command, CommandOutcome};
pub use error::{CatalogError, Result};
pub use export::{export_csv, EXPORT_COLUMNS};
pub use import::{bootstrap, import_file, BootstrapOutcome, DEFAULT_SOURCE_FILE};
pub use normalizer::{normalize_region, normalize_row, title_case, UNKNOWN_NAME, UNKNOWN_REGION};
pub use persistence::{
    restore, save, MemoryStateStore, SqliteStateStore, StateStore, STATE_KEY,
};
pub use query::{region_set, run_query, QueryParams, SortOrder};
pub use store::{
    CatalogStore, Origin, Record, RecordFields, SourceBatch, SourceEntry, MANUAL_SOURCE,
};
pub use tabular::{parse_delimited, serialize_delimited};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
