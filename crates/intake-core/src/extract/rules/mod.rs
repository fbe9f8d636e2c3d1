//! Rule-based field extractors for invoice text.

pub mod amounts;
pub mod dates;
pub mod identifiers;
pub mod patterns;
pub mod vendor;

pub use amounts::{
    extract_amounts, extract_total, extract_vat_amount, parse_amount, to_money, AmountExtractor,
    InvoiceAmounts,
};
pub use dates::{extract_invoice_date, parse_date_token, DateExtractor};
pub use identifiers::{
    extract_company_numbers, extract_vat_numbers, IdentifierExtractor, IdentifierKind,
};
pub use vendor::{extract_vendor, VENDOR_MAX_LINE_CHARS};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value together with the text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span in the searched text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
