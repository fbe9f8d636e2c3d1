//! Heuristic field parser combining the rule extractors.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::fields::ExtractedFields;

use super::normalize::{collapse_whitespace, truncate_chars};
use super::rules::{
    extract_amounts, extract_company_numbers, extract_invoice_date, extract_vat_numbers,
    extract_vendor,
};

/// Result of field extraction on one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Whether the input was cut to the configured size limit.
    pub truncated: bool,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for field parsing.
///
/// Parsing never fails: fields the heuristics cannot find are left absent.
pub trait FieldParser {
    /// Parse fields from document text, with an optional vendor hint.
    fn parse(&self, text: &str, vendor_hint: Option<&str>) -> ExtractionResult;
}

/// Rule-based parser for invoice and receipt text.
#[derive(Debug, Clone)]
pub struct HeuristicFieldParser {
    /// Input beyond this many characters is ignored.
    max_input_chars: usize,
    /// Longest line accepted as a vendor name.
    vendor_max_line_chars: usize,
}

impl HeuristicFieldParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a parser from the extraction section of the configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_input_chars: config.max_input_chars,
            vendor_max_line_chars: config.vendor_max_line_chars,
        }
    }

    /// Set the input size limit.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    /// Set the vendor line length limit.
    pub fn with_vendor_max_line_chars(mut self, max: usize) -> Self {
        self.vendor_max_line_chars = max;
        self
    }
}

impl Default for HeuristicFieldParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser for HeuristicFieldParser {
    fn parse(&self, text: &str, vendor_hint: Option<&str>) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let input = truncate_chars(text, self.max_input_chars);
        let truncated = input.len() < text.len();
        if truncated {
            warnings.push(format!(
                "Input truncated to {} characters",
                self.max_input_chars
            ));
        }

        info!(
            "Extracting fields from {} characters of text",
            input.chars().count()
        );

        let cleaned = collapse_whitespace(input);
        let amounts = extract_amounts(input);

        let fields = ExtractedFields {
            invoice_date: extract_invoice_date(input),
            vendor: extract_vendor(input, vendor_hint, self.vendor_max_line_chars),
            total: amounts.total,
            vat_amount: amounts.vat_amount,
            company_numbers: extract_company_numbers(&cleaned),
            vat_numbers: extract_vat_numbers(&cleaned),
        };

        for field in fields.missing_required() {
            warnings.push(format!("Could not extract {}", field));
        }
        if fields.total.is_some() && !amounts.total_from_label {
            warnings.push("No total line found, using the largest amount".to_string());
        }

        debug!(
            "Extracted date={:?} vendor={:?} total={:?} vat={:?}",
            fields.invoice_date, fields.vendor, fields.total, fields.vat_amount
        );

        ExtractionResult {
            fields,
            warnings,
            truncated,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract fields from document text with default settings.
pub fn extract_fields(text: &str, vendor_hint: Option<&str>) -> ExtractedFields {
    HeuristicFieldParser::new().parse(text, vendor_hint).fields
}
