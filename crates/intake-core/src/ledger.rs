//! Completeness gate between extraction and the ledger.
//!
//! A document whose fields include invoice date, vendor and total becomes a
//! [`LedgerEntry`]; anything else becomes a [`ReviewItem`] naming exactly the
//! missing fields. VAT amount and identifiers never gate.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::fields::{ExtractedFields, RequiredField};

/// Version recorded on every ledger row.
pub const EXTRACTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where a document came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentContext {
    /// File path or other locator of the document.
    pub source: String,
    /// Originating message id, if any.
    pub message_id: Option<String>,
    /// Originating message subject, if any.
    pub subject: Option<String>,
    /// Sender address, if any.
    pub sender: Option<String>,
}

impl DocumentContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// One ledger row for a complete document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub invoice_date: NaiveDate,
    pub vendor: String,
    pub total: Decimal,
    pub vat_amount: Option<Decimal>,
    pub vat_numbers: Option<BTreeSet<String>>,
    pub company_numbers: Option<BTreeSet<String>>,
    pub context: DocumentContext,
    pub extractor_version: String,
}

impl LedgerEntry {
    /// Column headers matching [`LedgerEntry::to_record`].
    pub const HEADERS: [&'static str; 11] = [
        "invoice_date",
        "vendor",
        "total",
        "vat_amount",
        "vat_numbers",
        "company_numbers",
        "source",
        "message_id",
        "subject",
        "sender",
        "extractor_version",
    ];

    /// Flatten into spreadsheet cells; identifier sets are joined with "; ".
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.invoice_date.to_string(),
            self.vendor.clone(),
            self.total.to_string(),
            self.vat_amount.map(|v| v.to_string()).unwrap_or_default(),
            join_set(self.vat_numbers.as_ref()),
            join_set(self.company_numbers.as_ref()),
            self.context.source.clone(),
            self.context.message_id.clone().unwrap_or_default(),
            self.context.subject.clone().unwrap_or_default(),
            self.context.sender.clone().unwrap_or_default(),
            self.extractor_version.clone(),
        ]
    }
}

/// A document routed to manual follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    /// Gating fields that were not extracted.
    pub missing: Vec<RequiredField>,
    /// One-line summary ("Missing fields: invoice_date, total").
    pub summary: String,
    /// Multi-line details for the reviewer.
    pub details: String,
    pub context: DocumentContext,
}

impl ReviewItem {
    /// Column headers matching [`ReviewItem::to_record`].
    pub const HEADERS: [&'static str; 4] = ["source", "message_id", "summary", "details"];

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.context.source.clone(),
            self.context.message_id.clone().unwrap_or_default(),
            self.summary.clone(),
            self.details.clone(),
        ]
    }
}

/// Outcome of the completeness gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    /// All gating fields present; append to the ledger.
    Ledger(LedgerEntry),
    /// Some gating field missing; needs manual review.
    Review(ReviewItem),
}

impl Disposition {
    pub fn is_ledger_ready(&self) -> bool {
        matches!(self, Disposition::Ledger(_))
    }
}

/// Route extracted fields to the ledger or to manual review.
pub fn classify(fields: &ExtractedFields, context: &DocumentContext) -> Disposition {
    let vendor = fields.vendor.as_deref().filter(|v| !v.is_empty());

    match (fields.invoice_date, vendor, fields.total) {
        (Some(invoice_date), Some(vendor), Some(total)) => Disposition::Ledger(LedgerEntry {
            invoice_date,
            vendor: vendor.to_string(),
            total,
            vat_amount: fields.vat_amount,
            vat_numbers: fields.vat_numbers.clone(),
            company_numbers: fields.company_numbers.clone(),
            context: context.clone(),
            extractor_version: EXTRACTOR_VERSION.to_string(),
        }),
        _ => {
            let missing = fields.missing_required();
            Disposition::Review(ReviewItem {
                summary: missing_summary(&missing),
                details: review_details(context),
                missing,
                context: context.clone(),
            })
        }
    }
}

/// "Missing fields: a, b".
pub fn missing_summary(missing: &[RequiredField]) -> String {
    let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
    format!("Missing fields: {}", names.join(", "))
}

fn review_details(context: &DocumentContext) -> String {
    format!(
        "Subject: {}\nSender: {}\nSource: {}",
        context.subject.as_deref().unwrap_or("(no subject)"),
        context.sender.as_deref().unwrap_or(""),
        context.source
    )
}

fn join_set(set: Option<&BTreeSet<String>>) -> String {
    set.map(|s| s.iter().map(String::as_str).collect::<Vec<_>>().join("; "))
        .unwrap_or_default()
}
