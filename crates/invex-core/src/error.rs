//! Error types for the invex-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invex library.
///
/// Only configuration problems end a batch. Per-document failures are
/// carried as [`DocumentError`] inside the record status instead.
#[derive(Error, Debug)]
pub enum InvexError {
    /// The input directory does not exist.
    #[error("the directory '{}' was not found", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The input directory holds no document with the expected extension.
    #[error("no {extension} files found in the directory '{}'", .directory.display())]
    NoDocuments {
        directory: PathBuf,
        extension: String,
    },

    /// Field pattern configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sink error.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating field patterns.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The pattern list is empty.
    #[error("no field patterns configured")]
    NoPatterns,

    /// A field name is empty.
    #[error("field name must not be empty")]
    EmptyName,

    /// Two patterns share a field name.
    #[error("duplicate field name: {0}")]
    DuplicateName(String),

    /// A field name collides with a column the batch processor adds itself.
    #[error("field name is reserved: {0}")]
    ReservedName(String),

    /// The pattern is not a valid regular expression.
    #[error("invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// The pattern does not define exactly one capture group.
    #[error("pattern for {field} must define exactly one capture group, found {found}")]
    CaptureGroups { field: String, found: usize },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Failure of a single document. Recorded in the record status; never
/// aborts the batch.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF could not be parsed or its text extracted.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// No page yielded any text.
    #[error("no text could be extracted from the file {0}")]
    EmptyText(String),

    /// Text was extracted but no field pattern matched.
    #[error("No information extracted from the file {0}")]
    NoFieldsMatched(String),
}

/// Errors related to persisting a batch.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Nothing to write; no header or column list can be derived.
    #[error("no records to write")]
    EmptyBatch,

    /// A record does not carry the schema's fields.
    #[error("record for {file} does not match the schema")]
    SchemaMismatch { file: String },

    /// Workbook writer error.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
