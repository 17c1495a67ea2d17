//! Survey QC pipeline: pull survey responses from a spreadsheet, derive
//! per-row rating metrics and a verdict, and republish the annotated table
//! with highlighted verdicts.
//!
//! ```text
//! SheetSource::get_values ─▶ process::transform ─▶ publish::publish ─▶ SheetHandle
//! ```

pub mod config;
pub mod error;
pub mod process;
pub mod publish;
pub mod sheets;

pub use error::{TransformError, WriteError};
pub use process::{transform, AugmentedTable, RawTable};
pub use publish::{publish, Destination, PublishSummary};
pub use sheets::{SheetHandle, SheetSource, SheetsError};
