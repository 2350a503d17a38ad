//! Batch processing of a directory of documents.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{DocumentError, InvexError, Result};
use crate::extract::FieldPatterns;
use crate::models::config::InputConfig;
use crate::models::record::{ExtractionRecord, Schema};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Processes every document of the input directory, one at a time.
///
/// Per-document failures never abort the batch: they become records whose
/// fields are all `N/A` and whose status carries the error.
pub struct BatchProcessor<P = PdfExtractor> {
    input: InputConfig,
    patterns: FieldPatterns,
    schema: Schema,
    processor: PhantomData<fn() -> P>,
}

impl BatchProcessor<PdfExtractor> {
    /// Create a batch processor reading PDFs with [`PdfExtractor`].
    pub fn new(input: InputConfig, patterns: FieldPatterns) -> Self {
        Self::with_processor(input, patterns)
    }
}

impl<P: PdfProcessor + Default> BatchProcessor<P> {
    /// Create a batch processor using `P` for text extraction.
    pub fn with_processor(input: InputConfig, patterns: FieldPatterns) -> Self {
        let schema = patterns.schema();
        Self {
            input,
            patterns,
            schema,
            processor: PhantomData,
        }
    }

    /// Column schema shared by every record this processor produces.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    /// List the documents to process, sorted by file name.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let directory = &self.input.directory;
        if !directory.exists() {
            return Err(InvexError::DirectoryNotFound(directory.clone()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(directory)? {
            let entry = entry?;
            let name = entry.file_name();
            if self.input.matches(&name.to_string_lossy()) {
                files.push(entry.path());
            }
        }

        if files.is_empty() {
            return Err(InvexError::NoDocuments {
                directory: directory.clone(),
                extension: self.input.extension.clone(),
            });
        }

        files.sort();
        debug!("Found {} documents in {}", files.len(), directory.display());
        Ok(files)
    }

    /// Process every document of the input directory.
    pub fn process(&self) -> Result<Vec<ExtractionRecord>> {
        self.process_with(|_| {})
    }

    /// Process every document, reporting each finished record to
    /// `on_record`.
    ///
    /// Fails only when the directory is missing or holds no documents.
    pub fn process_with<F>(&self, mut on_record: F) -> Result<Vec<ExtractionRecord>>
    where
        F: FnMut(&ExtractionRecord),
    {
        let start = Instant::now();
        let files = self.discover()?;

        let mut records = Vec::with_capacity(files.len());
        for path in &files {
            let record = self.record_for(path);
            on_record(&record);
            records.push(record);
        }

        let completed = records.iter().filter(|r| r.status().is_completed()).count();
        info!(
            "Processed {} documents in {:?} ({} completed, {} failed)",
            records.len(),
            start.elapsed(),
            completed,
            records.len() - completed
        );

        Ok(records)
    }

    /// Extract the fields of a single document.
    pub fn process_document(&self, path: &Path) -> std::result::Result<ExtractionRecord, DocumentError> {
        let file_name = file_name(path);

        let data = fs::read(path)?;
        let mut pdf = P::default();
        pdf.load(&data)?;

        let text = pdf.extract_text()?;
        if text.trim().is_empty() {
            return Err(DocumentError::EmptyText(file_name));
        }

        let fields = self.patterns.extract(&text);
        if fields.iter().all(|f| !f.is_available()) {
            return Err(DocumentError::NoFieldsMatched(file_name));
        }

        debug!(
            "Extracted {}/{} fields from {}",
            fields.iter().filter(|f| f.is_available()).count(),
            fields.len(),
            file_name
        );

        Ok(ExtractionRecord::completed(fields, file_name))
    }

    fn record_for(&self, path: &Path) -> ExtractionRecord {
        match self.process_document(path) {
            Ok(record) => record,
            Err(e) => {
                let file_name = file_name(path);
                warn!("Failed to process {}: {}", file_name, e);
                ExtractionRecord::failed(&self.schema, file_name, e.to_string())
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
