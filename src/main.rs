use anyhow::{Context, Result};
use reqwest::Client;
use std::{path::Path, process::ExitCode};
use surveyqc::{
    config::Config,
    process::{transform, TableSummary},
    publish::{publish, PublishSummary},
    sheets::{SheetSource, SheetsClient, SheetsError},
};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

enum Outcome {
    Published(PublishSummary),
    NothingToDo,
}

/// stderr always; a plain-text file as well when `log_file` is set.
fn init_logging(level: &str, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file.and_then(|p| Some((p.parent(), p.file_name()?))) {
        Some((dir, name)) => {
            let dir = dir.filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    guard
}

async fn run(config: &Config) -> Result<Outcome> {
    let http = Client::builder().build().context("building HTTP client")?;
    let source = SheetsClient::new(
        http,
        config.api_base.clone(),
        &config.access_token,
        &config.source_spreadsheet_id,
    );

    // ─── 1) fetch ────────────────────────────────────────────────────
    info!(spreadsheet = %config.source_spreadsheet_id, range = %config.source_range, "fetching source values");
    let raw = match source.get_values(&config.source_range).await {
        Ok(raw) => raw,
        Err(SheetsError::RangeNotFound(range)) => {
            warn!(%range, "source range does not exist; nothing to do");
            return Ok(Outcome::NothingToDo);
        }
        Err(e) => return Err(e).context("fetching source values"),
    };
    info!(rows = raw.rows.len(), "retrieved rows");

    // ─── 2) validate + derive ────────────────────────────────────────
    let table = match transform(raw) {
        Ok(table) => table,
        Err(e) if e.is_empty_input() => {
            warn!("no data found in the spreadsheet; nothing to do");
            return Ok(Outcome::NothingToDo);
        }
        Err(e) => return Err(e).context("no data produced"),
    };
    let summary = TableSummary::of(&table);
    info!(
        rows = summary.rows,
        ok = summary.results.ok,
        not_ok = summary.results.not_ok,
        undetermined = summary.results.undetermined,
        "table ready"
    );

    // ─── 3) publish ──────────────────────────────────────────────────
    let target = source.for_spreadsheet(&config.target_spreadsheet_id);
    let published = publish(&target, &config.destination, table)
        .await
        .context("publish failed")?;
    Ok(Outcome::Published(published))
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    let _guard = match &config {
        Ok(c) => init_logging(&c.log_level, c.log_file.as_deref()),
        Err(_) => init_logging("info", None),
    };
    info!("startup");

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("configuration error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(Outcome::Published(s)) => {
            info!(rows = s.rows_written, columns = s.columns_written, "process completed successfully");
            ExitCode::SUCCESS
        }
        Ok(Outcome::NothingToDo) => {
            info!("nothing published");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
