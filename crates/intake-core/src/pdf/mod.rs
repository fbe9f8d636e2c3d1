//! PDF text loading.

mod extractor;

pub use extractor::{PdfContent, PdfExtractor};

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Pages are images without fonts; needs OCR before extraction.
    Scanned,
    /// Empty or unreadable.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}
