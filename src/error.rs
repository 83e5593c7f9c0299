// Error kinds shared by every catalog operation.
//
// None of these are fatal: every failure path returns control with the
// store left in its last valid state. Corrupt persisted *content* never
// surfaces at all; the persistence layer logs it and reports "absent".

use std::io;

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required user-supplied field was missing or empty.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A file with this name was already ingested (file names are the
    /// duplicate-detection key, compared case-sensitively).
    #[error("file '{file_name}' is already loaded")]
    DuplicateSource { file_name: String },

    /// Edit/remove referenced an id that is not in the store.
    #[error("no catalog entry with id '{id}'")]
    NotFound { id: String },

    /// Malformed delimited text. Carries the parser's first reported
    /// message; the whole batch is aborted, nothing is merged.
    #[error("could not parse tabular data: {0}")]
    Parse(String),

    /// The bootstrap default source could not be read.
    #[error("default source unavailable: {0}")]
    Fetch(#[from] io::Error),

    /// The durable state store failed an operation.
    #[error("state store failure: {0}")]
    Persistence(String),

    /// Plumbing failure that should not occur in practice (e.g. writing
    /// CSV into an in-memory buffer).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Persistence(err.to_string())
    }
}
