// src/sheets/mod.rs
//
// Boundary to the spreadsheet service: what the pipeline reads from and
// writes to. `SheetsClient` talks to the real API, `MemorySheet` stands in
// for it in tests.

pub mod a1;
pub mod client;
pub mod memory;
pub mod rules;

pub use client::SheetsClient;
pub use memory::{MemorySheet, Operation};
pub use rules::{Color, ConditionalRule, GridRange};

use crate::process::RawTable;
use thiserror::Error;

/// Failures reported by a sheet collaborator.
#[derive(Error, Debug)]
pub enum SheetsError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request to sheets API failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("sheets API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The requested range does not exist in the spreadsheet.
    #[error("range {0:?} does not exist")]
    RangeNotFound(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read side: the fetch collaborator.
#[allow(async_fn_in_trait)]
pub trait SheetSource {
    /// Cell values of `range` as strings, header row first. An empty range is
    /// an empty table, not an error.
    async fn get_values(&self, range: &str) -> Result<RawTable, SheetsError>;
}

/// Write side: everything the publisher needs from a destination spreadsheet.
#[allow(async_fn_in_trait)]
pub trait SheetHandle {
    /// Remove every value inside `range`.
    async fn clear(&self, range: &str) -> Result<(), SheetsError>;

    /// Write `rows` as one block whose top-left cell is the start of `range`.
    async fn update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Install `rules` in a single call, replacing existing rules with the
    /// same target range and predicate.
    async fn apply_formatting_rules(&self, rules: Vec<ConditionalRule>) -> Result<(), SheetsError>;
}
