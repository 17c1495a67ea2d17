use crate::process::metrics::DerivedMetrics;
use crate::process::schema::{self, ColumnIndex};
use crate::process::utils::{cell_at, parse_rating};

/// The five survey ratings. Each is `None` when the cell was blank or not a number.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ratings {
    pub context_awareness: Option<f64>,
    pub autonomy: Option<f64>,
    pub experience: Option<f64>,
    pub output_quality: Option<f64>,
    pub overall: Option<f64>,
}

impl Ratings {
    /// The four ratings that feed `Mean Rating`.
    pub fn mean_inputs(&self) -> [Option<f64>; 4] {
        [
            self.context_awareness,
            self.autonomy,
            self.experience,
            self.output_quality,
        ]
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        match column {
            schema::CONTEXT_AWARENESS => self.context_awareness,
            schema::AUTONOMY => self.autonomy,
            schema::EXPERIENCE => self.experience,
            schema::OUTPUT_QUALITY => self.output_quality,
            schema::OVERALL_RATING => self.overall,
            _ => None,
        }
    }
}

/// One validated survey response.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub email_address: String,
    pub tool: String,
    pub feature: String,
    pub ratings: Ratings,
    pub unique_id: String,
    pub metrics: DerivedMetrics,
}

impl Record {
    /// Build a record from a source row. Cells past the end of a short row read as "".
    pub fn from_row(row: &[String], columns: &ColumnIndex) -> Self {
        let text = |name: &str| -> String {
            columns
                .position(name)
                .map(|i| cell_at(row, i).to_string())
                .unwrap_or_default()
        };
        let rating = |name: &str| columns.position(name).and_then(|i| parse_rating(cell_at(row, i)));

        let ratings = Ratings {
            context_awareness: rating(schema::CONTEXT_AWARENESS),
            autonomy: rating(schema::AUTONOMY),
            experience: rating(schema::EXPERIENCE),
            output_quality: rating(schema::OUTPUT_QUALITY),
            overall: rating(schema::OVERALL_RATING),
        };
        let metrics = DerivedMetrics::compute(&ratings.mean_inputs(), ratings.overall);

        Self {
            email_address: text(schema::EMAIL_ADDRESS),
            tool: text(schema::TOOL),
            feature: text(schema::FEATURE),
            ratings,
            unique_id: text(schema::UNIQUE_ID),
            metrics,
        }
    }
}
