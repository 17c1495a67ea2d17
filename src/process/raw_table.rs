/// Rows exactly as the values endpoint returned them.
///
/// Row 0 is the header; everything after it is data. Trailing empty cells are
/// dropped by the remote API, so rows can be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, from row 0. `None` when the table has no rows at all.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Every row after the header, in source order.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

impl From<Vec<Vec<String>>> for RawTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}
