//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
///
/// A fresh processor is created for every document of a batch.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed). Pages without
    /// extractable text return an empty string.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text from the entire PDF.
    ///
    /// Each page that yields text contributes that text followed by a single
    /// space; empty pages contribute nothing.
    fn extract_text(&self) -> Result<String> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            let page_text = self.extract_page_text(page)?;
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push(' ');
            }
        }
        Ok(text)
    }
}
