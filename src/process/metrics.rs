use std::fmt;

/// Half-width of the tolerance band around zero, inclusive on both ends.
pub const DIFFERENCE_TOLERANCE: f64 = 1.0;

/// QC verdict for a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QcResult {
    Ok,
    NotOk,
}

impl QcResult {
    pub const OK_LABEL: &'static str = "Ok";
    pub const NOT_OK_LABEL: &'static str = "Not ok";

    /// Classify a full-precision difference. Never call this with a rounded value.
    pub fn from_difference(diff: f64) -> Self {
        if (-DIFFERENCE_TOLERANCE..=DIFFERENCE_TOLERANCE).contains(&diff) {
            QcResult::Ok
        } else {
            QcResult::NotOk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QcResult::Ok => Self::OK_LABEL,
            QcResult::NotOk => Self::NOT_OK_LABEL,
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            Self::OK_LABEL => Some(QcResult::Ok),
            Self::NOT_OK_LABEL => Some(QcResult::NotOk),
            _ => None,
        }
    }
}

impl fmt::Display for QcResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values computed from a record's ratings, at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    pub mean_rating: Option<f64>,
    pub difference: Option<f64>,
    /// `None` when `difference` is missing; such rows get no verdict.
    pub result: Option<QcResult>,
}

impl DerivedMetrics {
    pub fn compute(mean_inputs: &[Option<f64>], overall: Option<f64>) -> Self {
        let mean_rating = mean_skip_missing(mean_inputs);
        let difference = match (mean_rating, overall) {
            (Some(m), Some(o)) => Some(m - o),
            _ => None,
        };
        Self {
            mean_rating,
            difference,
            result: difference.map(QcResult::from_difference),
        }
    }
}

/// Arithmetic mean of the present values; `None` if every value is missing.
pub fn mean_skip_missing(values: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
