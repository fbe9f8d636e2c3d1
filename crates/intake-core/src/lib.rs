//! Core library for invoice and receipt intake.
//!
//! This crate provides:
//! - Heuristic field extraction from invoice text (date, vendor, total, VAT
//!   amount, VAT and company registration numbers)
//! - PDF text loading
//! - The completeness gate routing documents to the ledger or manual review
//! - Bank statement parsing for reconciliation

pub mod bank;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod models;
pub mod paths;
pub mod pdf;

pub use bank::{BankTransaction, ColumnMap, Statement};
pub use error::{IntakeError, PdfError, Result, StatementError};
pub use extract::{extract_fields, ExtractionResult, FieldParser, HeuristicFieldParser};
pub use ledger::{classify, Disposition, DocumentContext, LedgerEntry, ReviewItem};
pub use models::{ExtractedFields, IntakeConfig, RequiredField};
pub use paths::safe_filename;
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
