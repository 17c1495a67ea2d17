// src/publish/mod.rs
//
// Clear → write → annotate. Each remote call is a hard gate: the first
// failure aborts the rest and nothing is rolled back.

use crate::error::WriteError;
use crate::process::{schema, AugmentedTable, QcResult};
use crate::sheets::{a1, Color, ConditionalRule, GridRange, SheetHandle};
use tracing::{error, info, instrument};

/// Background for rows whose verdict is "Ok".
pub const OK_BACKGROUND: Color = Color::rgb(0.7176, 0.8823, 0.7176);
/// Background for rows whose verdict is "Not ok".
pub const NOT_OK_BACKGROUND: Color = Color::rgb(0.9568, 0.7176, 0.7176);

/// Columns wiped before every write; wider than any table we publish.
const CLEAR_COLUMNS: &str = "A:Z";

/// Where the augmented table is published inside the destination spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub sheet_name: String,
    /// Numeric id of the tab, used by formatting rules.
    pub sheet_id: i64,
}

impl Destination {
    pub fn new(sheet_name: impl Into<String>, sheet_id: i64) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            sheet_id,
        }
    }

    pub fn clear_range(&self) -> String {
        a1::qualify(&self.sheet_name, CLEAR_COLUMNS)
    }

    pub fn anchor(&self) -> String {
        a1::qualify(&self.sheet_name, "A1")
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::new("Sheet1", 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    /// Data rows, header excluded.
    pub rows_written: usize,
    pub columns_written: usize,
    /// Zero-based position of the `Result` column.
    pub result_column: usize,
}

/// The two highlight rules over the data rows of the `Result` column.
pub fn qc_rules(sheet_id: i64, result_column: u32) -> Vec<ConditionalRule> {
    let range = GridRange::column_from_row(sheet_id, result_column, 1);
    vec![
        ConditionalRule::text_equals(range.clone(), QcResult::OK_LABEL, OK_BACKGROUND),
        ConditionalRule::text_equals(range, QcResult::NOT_OK_LABEL, NOT_OK_BACKGROUND),
    ]
}

/// Republish `table` to `destination`, replacing whatever was there.
#[instrument(level = "info", skip(sheet, table), fields(sheet = %destination.sheet_name, rows = table.num_rows()))]
pub async fn publish<S: SheetHandle>(
    sheet: &S,
    destination: &Destination,
    table: AugmentedTable,
) -> Result<PublishSummary, WriteError> {
    // 0) serialize first; the Result column is always appended by `transform`
    let values = table.to_rows();
    let header = values.first().map(Vec::as_slice).unwrap_or_default();
    let result_column = header
        .iter()
        .position(|h| h == schema::RESULT)
        .ok_or_else(|| WriteError::ColumnNotFound {
            column: schema::RESULT.to_string(),
        })?;
    let columns_written = header.len();
    let rows_written = values.len().saturating_sub(1);

    // 1) clear
    let clear_range = destination.clear_range();
    info!(range = %clear_range, "clearing destination");
    sheet.clear(&clear_range).await.map_err(|source| {
        error!(error = %source, "clear failed");
        WriteError::Clear {
            range: clear_range.clone(),
            source,
        }
    })?;

    // 2) one batched write from the top-left anchor
    let anchor = destination.anchor();
    info!(range = %anchor, rows = values.len(), "writing values");
    sheet.update(&anchor, values).await.map_err(|source| {
        error!(error = %source, "update failed");
        WriteError::Update {
            range: anchor.clone(),
            rows: rows_written,
            source,
        }
    })?;

    // 3) highlight verdicts
    let rules = qc_rules(destination.sheet_id, result_column as u32);
    sheet
        .apply_formatting_rules(rules)
        .await
        .map_err(|source| {
            error!(error = %source, "formatting failed");
            WriteError::Format { source }
        })?;

    info!(rows_written, result_column, "published table and formatting");
    Ok(PublishSummary {
        rows_written,
        columns_written,
        result_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{transform, RawTable};
    use crate::sheets::{MemorySheet, Operation};

    fn raw(rows: &[&[&str]]) -> RawTable {
        let mut all = vec![schema::REQUIRED_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()];
        all.extend(rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()));
        RawTable::new(all)
    }

    fn sample() -> AugmentedTable {
        transform(raw(&[
            &["test1@email.com", "Tool1", "Feature1", "4", "3", "5", "4", "4", "ID1"],
            &["test2@email.com", "Tool2", "Feature2", "5", "5", "5", "5", "2", "ID2"],
        ]))
        .unwrap()
    }

    #[test]
    fn destination_ranges() {
        let d = Destination::default();
        assert_eq!(d.clear_range(), "Sheet1!A:Z");
        assert_eq!(d.anchor(), "Sheet1!A1");
        assert_eq!(Destination::new("QC Results", 3).anchor(), "'QC Results'!A1");
    }

    #[test]
    fn rules_target_result_data_rows() {
        let rules = qc_rules(0, 11);
        assert_eq!(rules.len(), 2);
        for r in &rules {
            assert_eq!(r.ranges, vec![GridRange::column_from_row(0, 11, 1)]);
            assert_eq!(r.ranges[0].start_row_index, Some(1));
        }
        assert_eq!(
            rules[0].boolean_rule.condition.values[0].user_entered_value,
            "Ok"
        );
        assert_eq!(
            rules[1].boolean_rule.format.background_color,
            Some(NOT_OK_BACKGROUND)
        );
    }

    #[tokio::test]
    async fn publishes_values_and_rules() {
        let sheet = MemorySheet::new();
        let summary = publish(&sheet, &Destination::default(), sample())
            .await
            .unwrap();
        assert_eq!(
            summary,
            PublishSummary {
                rows_written: 2,
                columns_written: 12,
                result_column: 11
            }
        );
        assert_eq!(
            sheet.calls(),
            vec![Operation::Clear, Operation::Update, Operation::Format]
        );
        assert_eq!(sheet.cell(0, 11).as_deref(), Some("Result"));
        assert_eq!(sheet.cell(1, 9).as_deref(), Some("4.0"));
        assert_eq!(sheet.cell(1, 11).as_deref(), Some("Ok"));
        assert_eq!(sheet.cell(2, 10).as_deref(), Some("3.0"));
        assert_eq!(sheet.cell(2, 11).as_deref(), Some("Not ok"));
        assert_eq!(sheet.rules().len(), 2);
    }

    #[tokio::test]
    async fn republishing_is_idempotent() {
        let sheet = MemorySheet::new();
        let dest = Destination::default();
        publish(&sheet, &dest, sample()).await.unwrap();
        let first = sheet.snapshot();
        publish(&sheet, &dest, sample()).await.unwrap();
        assert_eq!(sheet.snapshot(), first);
        assert_eq!(sheet.rules().len(), 2);
    }

    #[tokio::test]
    async fn smaller_table_leaves_no_residue() {
        let stale: Vec<Vec<String>> = (0..20)
            .map(|r| (0..15).map(|c| format!("old{r}-{c}")).collect())
            .collect();
        let sheet = MemorySheet::with_rows(&stale);
        publish(&sheet, &Destination::default(), sample())
            .await
            .unwrap();
        let snap = sheet.snapshot();
        assert_eq!(snap.len(), 3);
        assert!(snap.iter().all(|row| row.len() <= 12));
        assert!(snap.iter().flatten().all(|c| !c.starts_with("old")));
    }

    #[tokio::test]
    async fn clear_failure_aborts_everything() {
        let sheet = MemorySheet::new();
        sheet.fail_on(Operation::Clear);
        let err = publish(&sheet, &Destination::default(), sample())
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::Clear { .. }));
        assert_eq!(sheet.calls(), vec![Operation::Clear]);
    }

    #[tokio::test]
    async fn update_failure_skips_formatting() {
        let sheet = MemorySheet::new();
        sheet.fail_on(Operation::Update);
        let err = publish(&sheet, &Destination::default(), sample())
            .await
            .unwrap_err();
        match err {
            WriteError::Update { range, rows, .. } => {
                assert_eq!(range, "Sheet1!A1");
                assert_eq!(rows, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(sheet.calls(), vec![Operation::Clear, Operation::Update]);
    }

    #[tokio::test]
    async fn formatting_failure_is_reported_after_write() {
        let sheet = MemorySheet::new();
        sheet.fail_on(Operation::Format);
        let err = publish(&sheet, &Destination::default(), sample())
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::Format { .. }));
        // values stay written; no rollback
        assert_eq!(sheet.cell(2, 11).as_deref(), Some("Not ok"));
        assert!(sheet.rules().is_empty());
    }

    #[tokio::test]
    async fn empty_table_still_writes_header() {
        let sheet = MemorySheet::new();
        let summary = publish(&sheet, &Destination::default(), transform(raw(&[])).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.rows_written, 0);
        assert_eq!(sheet.snapshot().len(), 1);
    }
}
