// src/error.rs

use crate::sheets::SheetsError;
use thiserror::Error;

/// Why a raw table could not be turned into an augmented one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The source returned no rows at all, not even a header.
    #[error("no rows in source table")]
    EmptyInput,

    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A required column name appears more than once in the header.
    #[error("ambiguous duplicated columns: {}", .duplicates.join(", "))]
    DuplicateColumns { duplicates: Vec<String> },

    /// Arrow rejected the assembled columns.
    #[error("failed to assemble table: {0}")]
    Assemble(String),
}

impl TransformError {
    /// True when the caller should treat this as "nothing to do".
    pub fn is_empty_input(&self) -> bool {
        matches!(self, TransformError::EmptyInput)
    }
}

impl From<arrow::error::ArrowError> for TransformError {
    fn from(err: arrow::error::ArrowError) -> Self {
        TransformError::Assemble(err.to_string())
    }
}

/// A publish step failed. Steps already executed are not rolled back.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("clearing {range} failed: {source}")]
    Clear {
        range: String,
        #[source]
        source: SheetsError,
    },

    #[error("writing {rows} rows at {range} failed: {source}")]
    Update {
        range: String,
        rows: usize,
        #[source]
        source: SheetsError,
    },

    #[error("applying conditional formatting failed: {source}")]
    Format {
        #[source]
        source: SheetsError,
    },

    /// The table handed to the writer has no such column. Indicates a bug
    /// upstream, not a user error.
    #[error("column {column:?} not found in table header")]
    ColumnNotFound { column: String },
}
