//! In-memory single-sheet stand-in for the spreadsheet service (testing only).
//!
//! Sheet names in ranges are ignored. Every call is recorded, and any
//! operation can be made to fail so callers' abort paths can be exercised.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use super::a1::Bounds;
use super::rules::ConditionalRule;
use super::{SheetHandle, SheetSource, SheetsError};
use crate::process::RawTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetValues,
    Clear,
    Update,
    Format,
}

#[derive(Debug, Default)]
struct Inner {
    /// (row, column) → value, zero-based.
    cells: BTreeMap<(usize, usize), String>,
    rules: Vec<ConditionalRule>,
    calls: Vec<Operation>,
    failing: HashSet<Operation>,
}

#[derive(Debug, Default)]
pub struct MemorySheet {
    inner: Mutex<Inner>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet pre-filled with `rows` from `A1`.
    pub fn with_rows(rows: &[Vec<String>]) -> Self {
        let sheet = Self::new();
        sheet.write_block(0, 0, rows);
        sheet
    }

    /// Make every later call of `op` fail.
    pub fn fail_on(&self, op: Operation) {
        self.inner.lock().unwrap().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn rules(&self) -> Vec<ConditionalRule> {
        self.inner.lock().unwrap().rules.clone()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<String> {
        self.inner.lock().unwrap().cells.get(&(row, col)).cloned()
    }

    /// Non-empty region from `A1` as rows, trailing empty cells dropped.
    pub fn snapshot(&self) -> Vec<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        collect_rows(&inner.cells, None)
    }

    fn write_block(&self, row0: usize, col0: usize, rows: &[Vec<String>]) {
        let mut inner = self.inner.lock().unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let key = (row0 + r, col0 + c);
                if value.is_empty() {
                    inner.cells.remove(&key);
                } else {
                    inner.cells.insert(key, value.clone());
                }
            }
        }
    }

    /// Record the call and fail it if requested.
    fn enter(&self, op: Operation) -> Result<(), SheetsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(op);
        if inner.failing.contains(&op) {
            return Err(SheetsError::Api {
                status: 500,
                message: format!("injected {op:?} failure"),
            });
        }
        Ok(())
    }
}

fn bounds(range: &str) -> Result<Bounds, SheetsError> {
    Bounds::parse(range).ok_or_else(|| SheetsError::RangeNotFound(range.to_string()))
}

fn collect_rows(cells: &BTreeMap<(usize, usize), String>, within: Option<&Bounds>) -> Vec<Vec<String>> {
    let inside = |r: usize, c: usize| within.map_or(true, |b| b.contains(r, c));
    let first_row = within.and_then(|b| b.first_row).unwrap_or(0);
    let first_col = within.map_or(0, |b| b.first_col);

    let last_row = cells
        .keys()
        .filter(|(r, c)| inside(*r, *c))
        .map(|(r, _)| *r)
        .max();
    let Some(last_row) = last_row else {
        return Vec::new();
    };

    (first_row..=last_row)
        .map(|r| {
            let last_col = cells
                .keys()
                .filter(|(rr, c)| *rr == r && inside(r, *c))
                .map(|(_, c)| *c)
                .max();
            match last_col {
                Some(last) => (first_col..=last)
                    .map(|c| cells.get(&(r, c)).cloned().unwrap_or_default())
                    .collect(),
                None => Vec::new(),
            }
        })
        .collect()
}

impl SheetSource for MemorySheet {
    async fn get_values(&self, range: &str) -> Result<RawTable, SheetsError> {
        self.enter(Operation::GetValues)?;
        let b = bounds(range)?;
        let inner = self.inner.lock().unwrap();
        Ok(RawTable::new(collect_rows(&inner.cells, Some(&b))))
    }
}

impl SheetHandle for MemorySheet {
    async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        self.enter(Operation::Clear)?;
        let b = bounds(range)?;
        let mut inner = self.inner.lock().unwrap();
        inner.cells.retain(|(r, c), _| !b.contains(*r, *c));
        Ok(())
    }

    async fn update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.enter(Operation::Update)?;
        let b = bounds(range)?;
        self.write_block(b.first_row.unwrap_or(0), b.first_col, &rows);
        Ok(())
    }

    async fn apply_formatting_rules(&self, rules: Vec<ConditionalRule>) -> Result<(), SheetsError> {
        self.enter(Operation::Format)?;
        let mut inner = self.inner.lock().unwrap();
        inner
            .rules
            .retain(|existing| !rules.iter().any(|r| r.same_target(existing)));
        inner.rules.extend(rules);
        Ok(())
    }
}
