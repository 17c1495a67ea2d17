// src/sheets/client.rs

use super::rules::{replacement_requests, ConditionalRule, FormatRequest};
use super::{SheetHandle, SheetSource, SheetsError};
use crate::process::RawTable;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/";

/// Sheets v4 REST client bound to one spreadsheet.
///
/// Authentication is a bearer token obtained elsewhere; this type never
/// refreshes or stores credentials.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base: Url,
    token: String,
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl SheetsClient {
    pub fn new(client: Client, base: Url, token: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client,
            base,
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Same connection pool and token, different spreadsheet.
    pub fn for_spreadsheet(&self, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            ..self.clone()
        }
    }

    /// `<base>/spreadsheets/<id>/<tail...>`, each tail part percent-encoded as one segment.
    fn endpoint(&self, tail: &[&str]) -> Result<Url, SheetsError> {
        endpoint(&self.base, &self.spreadsheet_id, tail)
    }

    fn batch_update_endpoint(&self) -> Result<Url, SheetsError> {
        endpoint(&self.base, &format!("{}:batchUpdate", self.spreadsheet_id), &[])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sheets request");
        self.client.request(method, url).bearer_auth(&self.token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, SheetsError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &body))
    }

    /// Current conditional-format rules of `sheet_id`, in index order.
    /// Rules this crate cannot model are kept as `None` so indexes line up.
    async fn conditional_formats(&self, sheet_id: i64) -> Result<Vec<Option<ConditionalRule>>, SheetsError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets(properties(sheetId),conditionalFormats)");
        let body: Value = self
            .send(self.request(Method::GET, url))
            .await?
            .json()
            .await?;
        Ok(rules_for_sheet(&body, sheet_id))
    }
}

impl SheetSource for SheetsClient {
    #[instrument(level = "info", skip(self), fields(spreadsheet = %self.spreadsheet_id))]
    async fn get_values(&self, range: &str) -> Result<RawTable, SheetsError> {
        let mut url = self.endpoint(&["values", range])?;
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");

        let body = match self.send(self.request(Method::GET, url)).await {
            Ok(resp) => resp.text().await?,
            Err(SheetsError::Api { status: 400, message }) if is_bad_range(&message) => {
                warn!(%range, %message, "range not found");
                return Err(SheetsError::RangeNotFound(range.to_string()));
            }
            Err(e) => return Err(e),
        };
        let table = decode_values(&body)?;
        debug!(rows = table.rows.len(), "fetched values");
        Ok(table)
    }
}

impl SheetHandle for SheetsClient {
    #[instrument(level = "debug", skip(self), fields(spreadsheet = %self.spreadsheet_id))]
    async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        let url = self.endpoint(&["values", &format!("{range}:clear")])?;
        self.send(self.request(Method::POST, url).json(&json!({})))
            .await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, rows), fields(spreadsheet = %self.spreadsheet_id, rows = rows.len()))]
    async fn update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let mut url = self.endpoint(&["values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        self.send(self.request(Method::PUT, url).json(&body)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, rules), fields(spreadsheet = %self.spreadsheet_id, rules = rules.len()))]
    async fn apply_formatting_rules(&self, rules: Vec<ConditionalRule>) -> Result<(), SheetsError> {
        let Some(sheet_id) = rules.first().and_then(|r| r.sheet_ids().next()) else {
            return Ok(());
        };

        let existing = self.conditional_formats(sheet_id).await?;
        let requests: Vec<FormatRequest> = replacement_requests(sheet_id, &existing, &rules);
        debug!(
            existing = existing.len(),
            requests = requests.len(),
            "replacing conditional formats"
        );

        let url = self.batch_update_endpoint()?;
        self.send(
            self.request(Method::POST, url)
                .json(&json!({ "requests": requests })),
        )
        .await?;
        Ok(())
    }
}

fn endpoint(base: &Url, spreadsheet_id: &str, tail: &[&str]) -> Result<Url, SheetsError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SheetsError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push("spreadsheets")
        .push(spreadsheet_id)
        .extend(tail);
    Ok(url)
}

fn is_bad_range(message: &str) -> bool {
    message.starts_with("Unable to parse range")
}

/// Map a non-success response to `SheetsError::Api`, preferring the API's own message.
fn api_error(status: u16, body: &str) -> SheetsError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    SheetsError::Api { status, message }
}

/// Decode a `ValueRange` body. Non-string cells are stringified; nulls become "".
fn decode_values(body: &str) -> Result<RawTable, SheetsError> {
    let vr: ValueRange =
        serde_json::from_str(body).map_err(|e| SheetsError::Decode(e.to_string()))?;
    let rows = vr
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect();
    Ok(RawTable::new(rows))
}

fn cell_to_string(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn rules_for_sheet(body: &Value, sheet_id: i64) -> Vec<Option<ConditionalRule>> {
    body["sheets"]
        .as_array()
        .into_iter()
        .flatten()
        // sheetId 0 is omitted from responses
        .find(|s| s["properties"]["sheetId"].as_i64().unwrap_or(0) == sheet_id)
        .and_then(|s| s["conditionalFormats"].as_array())
        .map(|rules| {
            rules
                .iter()
                .map(|r| serde_json::from_value(r.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(DEFAULT_API_BASE).unwrap()
    }

    #[test]
    fn builds_encoded_endpoints() {
        let url = endpoint(&base(), "abc123", &["values", "POD 5!A1:CE1000"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/POD%205!A1:CE1000"
        );
        let clear = endpoint(&base(), "abc123", &["values", "Sheet1!A:Z:clear"]).unwrap();
        assert!(clear.as_str().ends_with("/values/Sheet1!A:Z:clear"));

        let client = SheetsClient::new(Client::new(), base(), "t", "abc123");
        assert_eq!(
            client.batch_update_endpoint().unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123:batchUpdate"
        );
        assert_eq!(client.for_spreadsheet("xyz").spreadsheet_id(), "xyz");
    }

    #[test]
    fn decodes_value_ranges() {
        let body = r#"{"range":"Sheet1!A1:C3","majorDimension":"ROWS",
            "values":[["a","b","c"],["1",2,null],["x"]]}"#;
        let table = decode_values(body).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1], vec!["1", "2", ""]);
        assert_eq!(table.rows[2], vec!["x"]);

        let empty = decode_values(r#"{"range":"Sheet1!A1:C3","majorDimension":"ROWS"}"#).unwrap();
        assert!(empty.is_empty());

        assert!(matches!(decode_values("<html>"), Err(SheetsError::Decode(_))));
    }

    #[test]
    fn maps_api_errors() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: Nope!A1","status":"INVALID_ARGUMENT"}}"#;
        match api_error(400, body) {
            SheetsError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(is_bad_range(&message));
            }
            other => panic!("unexpected: {other:?}"),
        }
        match api_error(502, "  Bad Gateway \n") {
            SheetsError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn picks_rules_of_requested_sheet() {
        let body = json!({
            "sheets": [
                {
                    "properties": {},
                    "conditionalFormats": [
                        {"ranges": [{"startRowIndex": 1, "startColumnIndex": 11, "endColumnIndex": 12}],
                         "booleanRule": {"condition": {"type": "TEXT_EQ", "values": [{"userEnteredValue": "Ok"}]},
                                         "format": {}}},
                        {"ranges": [{"startColumnIndex": 0}], "gradientRule": {}}
                    ]
                },
                {"properties": {"sheetId": 7}}
            ]
        });
        let rules = rules_for_sheet(&body, 0);
        assert_eq!(rules.len(), 2);
        assert!(rules[0].is_some());
        assert!(rules[1].is_none());
        assert!(rules_for_sheet(&body, 7).is_empty());
        assert!(rules_for_sheet(&json!({}), 0).is_empty());
    }
}
