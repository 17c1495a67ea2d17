// src/process/mod.rs
pub mod metrics;
pub mod raw_table;
pub mod record;
pub mod schema;
pub mod stats;
pub mod table;
pub mod utils;

pub use metrics::{DerivedMetrics, QcResult};
pub use raw_table::RawTable;
pub use record::{Ratings, Record};
pub use stats::{ColumnStats, ResultCounts, TableSummary};
pub use table::AugmentedTable;

use crate::error::TransformError;
use schema::ColumnIndex;
use tracing::{debug, info, warn};

/// Validate `raw`, type its rating cells and append the QC columns.
///
/// - Fails with [`TransformError::EmptyInput`] when there is not even a header.
/// - Fails with [`TransformError::MissingColumns`] naming every absent column.
/// - Output row `i` is input data row `i`.
#[tracing::instrument(level = "info", skip(raw), fields(rows = raw.rows.len()))]
pub fn transform(raw: RawTable) -> Result<AugmentedTable, TransformError> {
    // 1) header row must exist
    let header = match raw.header() {
        Some(h) => h,
        None => {
            warn!("no data found in source table");
            return Err(TransformError::EmptyInput);
        }
    };
    debug!(columns = ?header, "source header");

    // 2) every required column present exactly once
    let columns = ColumnIndex::resolve(header).inspect_err(|e| {
        warn!(error = %e, "source header rejected");
    })?;

    // 3) typed records, same order as the source
    let records: Vec<Record> = raw
        .data_rows()
        .iter()
        .map(|row| Record::from_row(row, &columns))
        .collect();
    info!(records = records.len(), "built records from data rows");

    // 4) columnar table with derived metrics
    let table = AugmentedTable::from_records(&records)?;

    // the verdict distribution is reported by the caller
    for stats in &TableSummary::of(&table).columns {
        debug!("{}", stats);
    }

    Ok(table)
}
