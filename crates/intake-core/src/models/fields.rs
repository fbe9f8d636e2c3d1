//! Structured fields extracted from one document's text.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields pulled out of a single invoice or receipt.
///
/// Every field is optional: an absent value means the heuristics found
/// nothing usable, never that extraction was skipped. Amounts always carry
/// exactly two fraction digits and identifier sets are never empty when
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Invoice issue date.
    pub invoice_date: Option<NaiveDate>,

    /// Vendor name (sender hint or first short line of the document).
    pub vendor: Option<String>,

    /// Grand total.
    pub total: Option<Decimal>,

    /// VAT amount.
    pub vat_amount: Option<Decimal>,

    /// Company / chamber of commerce registration numbers.
    pub company_numbers: Option<BTreeSet<String>>,

    /// VAT registration numbers.
    pub vat_numbers: Option<BTreeSet<String>>,
}

impl ExtractedFields {
    /// Fields required for a ledger row that are absent, in ledger column order.
    pub fn missing_required(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| !self.has(*field))
            .collect()
    }

    /// Whether invoice date, vendor and total are all present.
    pub fn is_ledger_ready(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Whether no field at all was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn has(&self, field: RequiredField) -> bool {
        match field {
            RequiredField::InvoiceDate => self.invoice_date.is_some(),
            RequiredField::Vendor => !self.vendor.as_deref().is_none_or(str::is_empty),
            RequiredField::Total => self.total.is_some(),
        }
    }
}

/// A field that gates automatic ledger append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    InvoiceDate,
    Vendor,
    Total,
}

impl RequiredField {
    /// All gating fields, in ledger column order.
    pub const ALL: [RequiredField; 3] = [
        RequiredField::InvoiceDate,
        RequiredField::Vendor,
        RequiredField::Total,
    ];

    /// Field name as used in ledger headers and review summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::InvoiceDate => "invoice_date",
            RequiredField::Vendor => "vendor",
            RequiredField::Total => "total",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn complete() -> ExtractedFields {
        ExtractedFields {
            invoice_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            vendor: Some("ACME Consulting BV".to_string()),
            total: Some(Decimal::from_str("121.00").unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_record_is_ledger_ready() {
        let fields = complete();
        assert!(fields.is_ledger_ready());
        assert!(fields.missing_required().is_empty());
    }

    #[test]
    fn test_missing_fields_listed_in_order() {
        let fields = ExtractedFields {
            vendor: Some("ACME".to_string()),
            ..Default::default()
        };
        assert_eq!(
            fields.missing_required(),
            vec![RequiredField::InvoiceDate, RequiredField::Total]
        );
    }

    #[test]
    fn test_vat_and_identifiers_do_not_gate() {
        let mut fields = complete();
        fields.vat_amount = None;
        fields.vat_numbers = None;
        fields.company_numbers = None;
        assert!(fields.is_ledger_ready());
    }

    #[test]
    fn test_empty_vendor_counts_as_missing() {
        let mut fields = complete();
        fields.vendor = Some(String::new());
        assert_eq!(fields.missing_required(), vec![RequiredField::Vendor]);
    }

    #[test]
    fn test_serializes_amounts_as_strings() {
        let json = serde_json::to_value(complete()).unwrap();
        assert_eq!(json["total"], "121.00");
        assert_eq!(json["invoice_date"], "2026-02-01");
        assert!(json["vat_amount"].is_null());
    }

    #[test]
    fn test_required_field_names() {
        let names: Vec<&str> = RequiredField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, vec!["invoice_date", "vendor", "total"]);
    }
}
