use thiserror::Error;

use crate::types::SheetId;

/// Top-level error type for the DocFill reconciliation pipeline.
#[derive(Debug, Error)]
pub enum DocfillError {
    /// The sheet does not expose the two columns a key/value load needs.
    #[error("sheet '{sheet}' must have at least two columns (found {columns})")]
    Schema { sheet: SheetId, columns: usize },

    /// A resolution decision named a value that was never offered for the key.
    #[error("invalid selection for key '{key}': '{value}' is not an offered value")]
    InvalidSelection { key: String, value: String },

    #[error("key is empty after normalization (raw key: '{raw}')")]
    EmptyKey { raw: String },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The selector was cancelled or returned nothing to act on.
    #[error("no selection made: {0}")]
    NoSelection(String),

    #[error("failed to read sheet '{sheet}': {message}")]
    Source { sheet: SheetId, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = DocfillError> = std::result::Result<T, E>;
