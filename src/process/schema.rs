use crate::error::TransformError;
use arrow::datatypes::{DataType, Field, Schema};
use std::collections::HashMap;

pub const EMAIL_ADDRESS: &str = "Email Address";
pub const TOOL: &str = "Tool being used";
pub const FEATURE: &str = "Feature used";
pub const CONTEXT_AWARENESS: &str = "Context Awareness";
pub const AUTONOMY: &str = "Autonomy";
pub const EXPERIENCE: &str = "Experience";
pub const OUTPUT_QUALITY: &str = "Output Quality";
pub const OVERALL_RATING: &str = "Overall Rating";
pub const UNIQUE_ID: &str = "Unique ID";

pub const MEAN_RATING: &str = "Mean Rating";
pub const DIFFERENCE: &str = "Difference";
pub const RESULT: &str = "Result";

/// Columns the pipeline reads, in output order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    EMAIL_ADDRESS,
    TOOL,
    FEATURE,
    CONTEXT_AWARENESS,
    AUTONOMY,
    EXPERIENCE,
    OUTPUT_QUALITY,
    OVERALL_RATING,
    UNIQUE_ID,
];

/// Numeric, nullable survey columns.
pub const RATING_COLUMNS: [&str; 5] = [
    CONTEXT_AWARENESS,
    AUTONOMY,
    EXPERIENCE,
    OUTPUT_QUALITY,
    OVERALL_RATING,
];

/// The ratings averaged into `Mean Rating` (everything except the overall).
pub const MEAN_INPUT_COLUMNS: [&str; 4] = [CONTEXT_AWARENESS, AUTONOMY, EXPERIENCE, OUTPUT_QUALITY];

/// Columns appended after the required ones.
pub const DERIVED_COLUMNS: [&str; 3] = [MEAN_RATING, DIFFERENCE, RESULT];

pub fn is_numeric_column(name: &str) -> bool {
    RATING_COLUMNS.contains(&name) || name == MEAN_RATING || name == DIFFERENCE
}

/// Where each required column sits in the source header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    /// Validate `header` against [`REQUIRED_COLUMNS`].
    ///
    /// Reports every absent name at once. A required name that appears more
    /// than once is ambiguous and rejected; duplicates among columns the
    /// pipeline never reads are ignored.
    pub fn resolve(header: &[String]) -> Result<Self, TransformError> {
        let mut missing = Vec::new();
        let mut duplicates = Vec::new();
        let mut positions = HashMap::with_capacity(REQUIRED_COLUMNS.len());

        for name in REQUIRED_COLUMNS {
            let mut hits = header
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim() == name)
                .map(|(i, _)| i);
            match (hits.next(), hits.next()) {
                (None, _) => missing.push(name.to_string()),
                (Some(_), Some(_)) => duplicates.push(name.to_string()),
                (Some(i), None) => {
                    positions.insert(name, i);
                }
            }
        }

        if !missing.is_empty() {
            return Err(TransformError::MissingColumns { missing });
        }
        if !duplicates.is_empty() {
            return Err(TransformError::DuplicateColumns { duplicates });
        }
        Ok(Self { positions })
    }

    /// Source position of a required column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Arrow schema of the augmented table.
pub fn augmented_schema() -> Schema {
    let fields = REQUIRED_COLUMNS
        .iter()
        .chain(DERIVED_COLUMNS.iter())
        .map(|name| {
            let ty = if is_numeric_column(name) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(*name, ty, true)
        })
        .collect::<Vec<_>>();
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_positions_regardless_of_source_order() {
        let mut names: Vec<&str> = REQUIRED_COLUMNS.iter().rev().copied().collect();
        names.insert(2, "Timestamp");
        let idx = ColumnIndex::resolve(&header(&names)).unwrap();
        assert_eq!(idx.position(UNIQUE_ID), Some(0));
        assert_eq!(idx.position(EMAIL_ADDRESS), Some(9));
    }

    #[test]
    fn reports_every_missing_column() {
        let err = ColumnIndex::resolve(&header(&[EMAIL_ADDRESS, TOOL, FEATURE])).unwrap_err();
        match err {
            TransformError::MissingColumns { missing } => assert_eq!(
                missing,
                vec![
                    CONTEXT_AWARENESS,
                    AUTONOMY,
                    EXPERIENCE,
                    OUTPUT_QUALITY,
                    OVERALL_RATING,
                    UNIQUE_ID
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicated_required_column() {
        let mut names = REQUIRED_COLUMNS.to_vec();
        names.push(AUTONOMY);
        names.push("Notes");
        names.push("Notes");
        let err = ColumnIndex::resolve(&header(&names)).unwrap_err();
        match err {
            TransformError::DuplicateColumns { duplicates } => {
                assert_eq!(duplicates, vec![AUTONOMY])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn schema_has_derived_columns_last() {
        let schema = augmented_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(&names[9..], &DERIVED_COLUMNS);
        assert_eq!(
            schema.field_with_name(MEAN_RATING).unwrap().data_type(),
            &DataType::Float64
        );
        assert_eq!(
            schema.field_with_name(RESULT).unwrap().data_type(),
            &DataType::Utf8
        );
    }
}
