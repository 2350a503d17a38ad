//! Sinks persisting a batch of extraction records.
//!
//! Both sinks take the explicit [`Schema`] of the batch rather than inferring
//! columns from the first record, and both are independent: a failure in one
//! never affects the other.

mod database;
mod spreadsheet;

pub use database::DatabaseSink;
pub use spreadsheet::{spreadsheet_file_name, SpreadsheetSink};

use crate::error::SinkError;
use crate::models::record::{ExtractionRecord, Schema};

/// Result type for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Reject empty batches and records whose fields differ from `schema`.
fn validate(schema: &Schema, records: &[ExtractionRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(SinkError::EmptyBatch);
    }

    if let Some(record) = records.iter().find(|r| !r.matches_schema(schema)) {
        return Err(SinkError::SchemaMismatch {
            file: record.file_name().to_string(),
        });
    }

    Ok(())
}
