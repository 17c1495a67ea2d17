//! A1-notation helpers: sheet-qualified ranges and column letters.

/// Prefix `range` with a sheet name, quoting the name when it is not a bare word.
///
/// `qualify("Sheet1", "A1")` is `Sheet1!A1`; `qualify("POD 5", "A:Z")` is `'POD 5'!A:Z`.
pub fn qualify(sheet: &str, range: &str) -> String {
    let bare = !sheet.is_empty() && sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        format!("{}!{}", sheet, range)
    } else {
        format!("'{}'!{}", sheet.replace('\'', "''"), range)
    }
}

/// Split `Sheet!A1:B2` into `(Some("Sheet"), "A1:B2")`, unquoting the sheet name.
pub fn split_sheet(range: &str) -> (Option<String>, &str) {
    match range.rfind('!') {
        Some(i) => {
            let sheet = &range[..i];
            let sheet = if sheet.len() >= 2 && sheet.starts_with('\'') && sheet.ends_with('\'') {
                sheet[1..sheet.len() - 1].replace("''", "'")
            } else {
                sheet.to_string()
            };
            (Some(sheet), &range[i + 1..])
        }
        None => (None, range),
    }
}

/// Zero-based index of a column label: `A` → 0, `Z` → 25, `AA` → 26.
pub fn column_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut n = 0usize;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(n - 1)
}

/// A cell reference such as `B3`, as zero-based `(row, column)`.
pub fn cell(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let col = column_index(&reference[..split])?;
    let row: usize = reference[split..].parse().ok()?;
    (row > 0).then(|| (row - 1, col))
}

/// Inclusive, zero-based bounds of a range such as `A:Z`, `A1:C10` or `B2`.
/// Open sides (whole columns) are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub first_col: usize,
    pub last_col: usize,
    pub first_row: Option<usize>,
    pub last_row: Option<usize>,
}

impl Bounds {
    pub fn parse(range: &str) -> Option<Self> {
        let (_, body) = split_sheet(range);
        let (start, end) = body.split_once(':').unwrap_or((body, body));
        let side = |s: &str| -> Option<(Option<usize>, usize)> {
            match cell(s) {
                Some((r, c)) => Some((Some(r), c)),
                None => column_index(s).map(|c| (None, c)),
            }
        };
        let (first_row, first_col) = side(start)?;
        let (last_row, last_col) = side(end)?;
        Some(Self {
            first_col,
            last_col,
            first_row,
            last_row,
        })
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        col >= self.first_col
            && col <= self.last_col
            && self.first_row.map_or(true, |r| row >= r)
            && self.last_row.map_or(true, |r| row <= r)
    }
}
