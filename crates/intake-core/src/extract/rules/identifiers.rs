//! VAT and company registration number extraction.

use regex::Regex;
use std::collections::BTreeSet;

use super::patterns::{COMPANY_NUMBER, VAT_NUMBER};
use super::{ExtractionMatch, FieldExtractor};
use crate::extract::normalize::collapse_whitespace;

/// Kind of registration identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// VAT registration number ("NL123456789B01", "VAT No: ...").
    Vat,
    /// Company register number ("KvK: 12345678", "Company No. ...").
    Company,
}

impl IdentifierKind {
    fn pattern(&self) -> &'static Regex {
        match self {
            IdentifierKind::Vat => &VAT_NUMBER,
            IdentifierKind::Company => &COMPANY_NUMBER,
        }
    }
}

/// Identifier extractor for one identifier family.
///
/// Meant to run on whitespace-collapsed text; matched substrings keep their
/// original case.
pub struct IdentifierExtractor {
    kind: IdentifierKind,
}

impl IdentifierExtractor {
    pub fn new(kind: IdentifierKind) -> Self {
        Self { kind }
    }

    pub fn vat() -> Self {
        Self::new(IdentifierKind::Vat)
    }

    pub fn company() -> Self {
        Self::new(IdentifierKind::Company)
    }

    /// Distinct matches as a sorted set, or `None` if nothing matched.
    pub fn extract_set(&self, text: &str) -> Option<BTreeSet<String>> {
        let set: BTreeSet<String> = self
            .extract_all(text)
            .into_iter()
            .map(|m| m.value)
            .collect();
        (!set.is_empty()).then_some(set)
    }
}

impl FieldExtractor for IdentifierExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.kind
            .pattern()
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(1)?;
                let value = collapse_whitespace(m.as_str());
                Some(ExtractionMatch::new(value, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}

/// Extract VAT registration numbers from whitespace-collapsed text.
pub fn extract_vat_numbers(text: &str) -> Option<BTreeSet<String>> {
    IdentifierExtractor::vat().extract_set(text)
}

/// Extract company registration numbers from whitespace-collapsed text.
pub fn extract_company_numbers(text: &str) -> Option<BTreeSet<String>> {
    IdentifierExtractor::company().extract_set(text)
}
