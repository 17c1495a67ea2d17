use crate::process::metrics::QcResult;
use crate::process::schema::{DIFFERENCE, MEAN_RATING, RATING_COLUMNS};
use crate::process::table::AugmentedTable;
use std::fmt;

/// Count / mean / min / max of one numeric column, ignoring missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl fmt::Display for ColumnStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".into());
        write!(
            f,
            "{}: count={} missing={} mean={} min={} max={}",
            self.column,
            self.count,
            self.missing,
            opt(self.mean),
            opt(self.min),
            opt(self.max)
        )
    }
}

/// How the QC verdicts are distributed over the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultCounts {
    pub ok: usize,
    pub not_ok: usize,
    /// Rows whose difference could not be computed.
    pub undetermined: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnStats>,
    pub results: ResultCounts,
}

impl TableSummary {
    pub fn of(table: &AugmentedTable) -> Self {
        let columns = RATING_COLUMNS
            .iter()
            .chain([MEAN_RATING, DIFFERENCE].iter())
            .filter_map(|name| column_stats(table, name))
            .collect();

        let mut results = ResultCounts::default();
        for row in 0..table.num_rows() {
            match table.result(row).and_then(QcResult::from_label) {
                Some(QcResult::Ok) => results.ok += 1,
                Some(QcResult::NotOk) => results.not_ok += 1,
                None => results.undetermined += 1,
            }
        }

        Self {
            rows: table.num_rows(),
            columns,
            results,
        }
    }
}

fn column_stats(table: &AugmentedTable, name: &str) -> Option<ColumnStats> {
    let col = table.float_column(name)?;
    let values: Vec<f64> = col.iter().flatten().collect();
    let count = values.len();
    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    Some(ColumnStats {
        column: name.to_string(),
        count,
        missing: col.len() - count,
        mean,
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
    })
}
