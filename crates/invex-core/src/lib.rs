//! Core library for regex-driven PDF field extraction.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - Field extraction from document text with named, single-group patterns
//! - Batch processing of a directory with per-document failure isolation
//! - Spreadsheet (XLSX) and SQL table sinks for the batch result

pub mod batch;
pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod sink;

pub use batch::BatchProcessor;
pub use error::{ConfigError, DocumentError, InvexError, PdfError, Result, SinkError};
pub use extract::{FieldPattern, FieldPatterns};
pub use models::config::{DatabaseConfig, FieldPatternConfig, InputConfig, InvexConfig, SpreadsheetConfig};
pub use models::record::{ExtractionRecord, FieldValue, RecordStatus, Schema, NOT_AVAILABLE};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use sink::{DatabaseSink, SpreadsheetSink};
