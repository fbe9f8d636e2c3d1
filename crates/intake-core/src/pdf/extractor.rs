//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Share of image-only pages at which a document counts as scanned.
const SCANNED_PAGE_RATIO: f64 = 0.8;

/// PDF text extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    /// Pages to read text from (0 = all).
    max_pages: u32,
    /// Minimum non-whitespace characters for a text PDF.
    min_text_length: usize,
}

/// Text loaded from a PDF.
#[derive(Debug, Clone, Serialize)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Extracted text, limited to the configured pages.
    pub text: String,
    /// Total pages in the document.
    pub page_count: u32,
}

impl PdfExtractor {
    /// Create a new PDF extractor with default limits.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    /// Create an extractor from the PDF section of the configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            max_pages: config.max_pages,
            min_text_length: config.min_text_length,
        }
    }

    /// Set the page limit (0 = all pages).
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the minimum text length for a text PDF.
    pub fn with_min_text_length(mut self, min: usize) -> Self {
        self.min_text_length = min;
        self
    }

    /// Load a PDF and extract its text in one step.
    pub fn load_content(&mut self, data: &[u8]) -> Result<PdfContent> {
        self.load(data)?;
        let text = self.extract_text_limited()?;
        let pdf_type = self.classify(&text);

        info!(
            "Loaded {} chars of text from {} pages ({:?})",
            text.chars().count(),
            self.page_count(),
            pdf_type
        );

        Ok(PdfContent {
            pdf_type,
            text,
            page_count: self.page_count(),
        })
    }

    /// Extract text from the first `max_pages` pages.
    ///
    /// Uses the same backend whatever the page count, so the first pages of a
    /// document always read the same.
    pub fn extract_text_limited(&self) -> Result<String> {
        let limit = match self.max_pages {
            0 => None,
            n => Some(n as usize),
        };
        self.extract_pages(limit)
    }

    /// Text of the first `limit` pages (all when `None`), joined by newlines.
    fn extract_pages(&self, limit: Option<usize>) -> Result<String> {
        let doc = self.document()?;
        let take = limit.unwrap_or(usize::MAX);

        match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
            Ok(pages) => {
                debug!(
                    "Extracting text from {} of {} pages",
                    pages.len().min(take),
                    pages.len()
                );
                Ok(pages.into_iter().take(take).collect::<Vec<_>>().join("\n"))
            }
            Err(e) => {
                warn!("pdf-extract failed ({}), falling back to lopdf", e);
                let pages: Vec<u32> = doc.get_pages().keys().copied().take(take).collect();
                doc.extract_text(&pages)
                    .map_err(|e| PdfError::TextExtraction(e.to_string()))
            }
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    fn classify(&self, text: &str) -> PdfType {
        let meaningful = text.chars().filter(|c| !c.is_whitespace()).count();
        if meaningful >= self.min_text_length {
            PdfType::Text
        } else if self.looks_scanned() {
            PdfType::Scanned
        } else {
            PdfType::Empty
        }
    }

    /// Most pages carry images but no fonts.
    fn looks_scanned(&self) -> bool {
        let Some(doc) = self.document.as_ref() else {
            return false;
        };

        let pages = doc.get_pages();
        if pages.is_empty() {
            return false;
        }

        let image_only = pages
            .values()
            .filter(|page_id| {
                let Some(resources) = self.get_page_resources(doc, **page_id) else {
                    return false;
                };
                let has_fonts = non_empty_entry(doc, &resources, b"Font");
                let has_images = non_empty_entry(doc, &resources, b"XObject");
                has_images && !has_fonts
            })
            .count();

        let ratio = image_only as f64 / pages.len() as f64;
        debug!(
            "Scanned-page analysis: {} of {} pages image-only",
            image_only,
            pages.len()
        );
        ratio >= SCANNED_PAGE_RATIO
    }

    /// Resources dictionary for a page, following `Parent` inheritance.
    fn get_page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
        let dict = doc.get_object(node_id).ok()?.as_dict().ok()?;

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

fn non_empty_entry(doc: &Document, resources: &Dictionary, key: &[u8]) -> bool {
    resources
        .get(key)
        .ok()
        .and_then(|obj| doc.dereference(obj).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .is_some_and(|dict| !dict.is_empty())
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        let text = self.extract_text_limited().unwrap_or_default();
        self.classify(&text)
    }

    fn extract_text(&self) -> Result<String> {
        self.extract_pages(None)
    }
}
