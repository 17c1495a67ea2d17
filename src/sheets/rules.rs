// src/sheets/rules.rs
//
// Conditional-format rules in the shape the Sheets v4 API uses, so they
// serialize straight into `addConditionalFormatRule` requests.

use serde::{Deserialize, Serialize};

/// Zero-based, end-exclusive grid range. Unset bounds are open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// One column, from `first_row` to the bottom of the sheet.
    pub fn column_from_row(sheet_id: i64, column: u32, first_row: u32) -> Self {
        Self {
            sheet_id,
            start_row_index: Some(first_row),
            end_row_index: None,
            start_column_index: Some(column),
            end_column_index: Some(column + 1),
        }
    }
}

/// RGB with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(default)]
    pub red: f32,
    #[serde(default)]
    pub green: f32,
    #[serde(default)]
    pub blue: f32,
}

impl Color {
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionValue {
    pub user_entered_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanCondition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<ConditionValue>,
}

impl BooleanCondition {
    pub const TEXT_EQ: &'static str = "TEXT_EQ";

    pub fn text_eq(value: &str) -> Self {
        Self {
            kind: Self::TEXT_EQ.to_string(),
            values: vec![ConditionValue {
                user_entered_value: value.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanRule {
    pub condition: BooleanCondition,
    #[serde(default)]
    pub format: CellFormat,
}

/// A declarative rule the destination re-evaluates on every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub ranges: Vec<GridRange>,
    pub boolean_rule: BooleanRule,
}

impl ConditionalRule {
    /// Paint `background` wherever a cell in `range` equals `text`.
    pub fn text_equals(range: GridRange, text: &str, background: Color) -> Self {
        Self {
            ranges: vec![range],
            boolean_rule: BooleanRule {
                condition: BooleanCondition::text_eq(text),
                format: CellFormat {
                    background_color: Some(background),
                },
            },
        }
    }

    /// Same target and predicate. The colour is ignored since the API may
    /// echo channels back with different precision.
    pub fn same_target(&self, other: &ConditionalRule) -> bool {
        self.ranges == other.ranges && self.boolean_rule.condition == other.boolean_rule.condition
    }

    pub fn sheet_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ranges.iter().map(|r| r.sheet_id)
    }
}

/// One entry of a `spreadsheets.batchUpdate` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatRequest {
    #[serde(rename_all = "camelCase")]
    DeleteConditionalFormatRule { sheet_id: i64, index: usize },
    #[serde(rename_all = "camelCase")]
    AddConditionalFormatRule { rule: ConditionalRule, index: usize },
}

/// Requests that install `incoming` on a sheet whose current rules are
/// `existing`, replacing any rule with the same target and predicate.
///
/// Deletes come first, highest index first, so earlier indexes stay valid.
pub fn replacement_requests(
    sheet_id: i64,
    existing: &[Option<ConditionalRule>],
    incoming: &[ConditionalRule],
) -> Vec<FormatRequest> {
    let mut stale: Vec<usize> = existing
        .iter()
        .enumerate()
        .filter_map(|(i, rule)| {
            let rule = rule.as_ref()?;
            incoming.iter().any(|r| r.same_target(rule)).then_some(i)
        })
        .collect();
    stale.sort_unstable_by(|a, b| b.cmp(a));

    let mut out: Vec<FormatRequest> = stale
        .into_iter()
        .map(|index| FormatRequest::DeleteConditionalFormatRule { sheet_id, index })
        .collect();
    out.extend(
        incoming
            .iter()
            .enumerate()
            .map(|(index, rule)| FormatRequest::AddConditionalFormatRule {
                rule: rule.clone(),
                index,
            }),
    );
    out
}
