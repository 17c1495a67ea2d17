use crate::error::TransformError;
use crate::process::record::Record;
use crate::process::schema::{self, augmented_schema, RATING_COLUMNS};
use crate::process::utils::format_number;
use arrow::{
    array::{Array, ArrayRef, Float64Array, Float64Builder, StringArray, StringBuilder},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// Validated survey rows plus their derived QC columns.
///
/// Only [`crate::process::transform`] builds one, so the column layout is
/// always `REQUIRED_COLUMNS` followed by `DERIVED_COLUMNS`.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedTable {
    batch: RecordBatch,
}

impl AugmentedTable {
    /// Convert records into typed columns, preserving their order.
    pub(crate) fn from_records(records: &[Record]) -> Result<Self, TransformError> {
        let mut columns: Vec<ArrayRef> = vec![
            string_array(records, |r| r.email_address.as_str()),
            string_array(records, |r| r.tool.as_str()),
            string_array(records, |r| r.feature.as_str()),
        ];
        // ratings sit between Feature used and Unique ID, in RATING_COLUMNS order
        for name in RATING_COLUMNS {
            columns.push(float_array(records, |r| r.ratings.get(name)));
        }
        columns.push(string_array(records, |r| r.unique_id.as_str()));
        columns.push(float_array(records, |r| r.metrics.mean_rating));
        columns.push(float_array(records, |r| r.metrics.difference));

        let results: StringArray = records
            .iter()
            .map(|r| r.metrics.result.map(|v| v.label()))
            .collect();
        columns.push(Arc::new(results));

        let batch = RecordBatch::try_new(Arc::new(augmented_schema()), columns)?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Full-precision numeric column, if `name` is one.
    pub fn float_column(&self, name: &str) -> Option<&Float64Array> {
        self.batch
            .column_by_name(name)?
            .as_any()
            .downcast_ref::<Float64Array>()
    }

    pub fn text_column(&self, name: &str) -> Option<&StringArray> {
        self.batch
            .column_by_name(name)?
            .as_any()
            .downcast_ref::<StringArray>()
    }

    pub fn float_value(&self, name: &str, row: usize) -> Option<f64> {
        let col = self.float_column(name)?;
        (row < col.len() && col.is_valid(row)).then(|| col.value(row))
    }

    pub fn text_value(&self, name: &str, row: usize) -> Option<&str> {
        let col = self.text_column(name)?;
        (row < col.len() && col.is_valid(row)).then(|| col.value(row))
    }

    pub fn result(&self, row: usize) -> Option<&str> {
        self.text_value(schema::RESULT, row)
    }

    /// Header plus every row as display strings, ready for write-back.
    ///
    /// Numbers are rounded to two decimals here and nowhere else; nulls become "".
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.num_rows() + 1);
        out.push(self.column_names());

        let rendered: Vec<Vec<String>> = self
            .batch
            .columns()
            .iter()
            .map(|col| render_column(col.as_ref()))
            .collect();

        for row in 0..self.num_rows() {
            out.push(rendered.iter().map(|c| c[row].clone()).collect());
        }
        out
    }
}

fn string_array<'a>(records: &'a [Record], f: impl Fn(&'a Record) -> &'a str) -> ArrayRef {
    let mut b = StringBuilder::with_capacity(records.len(), records.len() * 16);
    for r in records {
        b.append_value(f(r));
    }
    Arc::new(b.finish())
}

fn float_array(records: &[Record], f: impl Fn(&Record) -> Option<f64>) -> ArrayRef {
    let mut b = Float64Builder::with_capacity(records.len());
    for r in records {
        b.append_option(f(r));
    }
    Arc::new(b.finish())
}

fn render_column(col: &dyn Array) -> Vec<String> {
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|arr| arr.iter().map(format_number).collect())
            .unwrap_or_else(|| vec![String::new(); col.len()]),
        _ => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| {
                arr.iter()
                    .map(|v| v.map(str::to_string).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_else(|| vec![String::new(); col.len()]),
    }
}
