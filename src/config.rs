// src/config.rs

use crate::publish::Destination;
use crate::sheets::client::DEFAULT_API_BASE;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_SOURCE_RANGE: &str = "POD 5!A1:CE1000";
pub const DEFAULT_TARGET_SHEET: &str = "Sheet1";

/// Everything the binary needs, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: Url,
    pub access_token: String,
    pub source_spreadsheet_id: String,
    pub source_range: String,
    pub target_spreadsheet_id: String,
    pub destination: Destination,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("environment variable {key} is not set"));

        let api_base = get("SHEETS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = Url::parse(&api_base).with_context(|| format!("parsing SHEETS_API_BASE {api_base:?}"))?;
        if api_base.cannot_be_a_base() {
            anyhow::bail!("SHEETS_API_BASE {} cannot be used as a base URL", api_base);
        }

        let sheet_id = match get("TARGET_SHEET_ID") {
            Some(v) => v
                .parse::<i64>()
                .with_context(|| format!("parsing TARGET_SHEET_ID {v:?}"))?,
            None => 0,
        };

        Ok(Self {
            api_base,
            access_token: require("SHEETS_ACCESS_TOKEN")?,
            source_spreadsheet_id: require("SOURCE_SPREADSHEET_ID")?,
            source_range: get("SOURCE_RANGE").unwrap_or_else(|| DEFAULT_SOURCE_RANGE.to_string()),
            target_spreadsheet_id: require("TARGET_SPREADSHEET_ID")?,
            destination: Destination::new(
                get("TARGET_SHEET_NAME").unwrap_or_else(|| DEFAULT_TARGET_SHEET.to_string()),
                sheet_id,
            ),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }
}
