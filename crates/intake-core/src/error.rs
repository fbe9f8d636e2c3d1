//! Error types for the intake-core library.
//!
//! Field extraction itself never fails; absent fields are ordinary values on
//! [`ExtractedFields`](crate::models::fields::ExtractedFields). The errors here
//! cover the I/O around it: loading PDFs, reading configuration and parsing
//! bank statements.

use thiserror::Error;

/// Main error type for the intake library.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Bank statement parsing error.
    #[error("statement error: {0}")]
    Statement(#[from] StatementError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to bank statement parsing.
#[derive(Error, Debug)]
pub enum StatementError {
    /// Required columns could not be inferred from the header row.
    #[error(
        "could not infer required columns (date/description/amount), headers found: {headers:?}"
    )]
    MissingColumns { headers: Vec<String> },

    /// The statement has no header row.
    #[error("statement is empty")]
    Empty,
}

/// Result type for the intake library.
pub type Result<T> = std::result::Result<T, IntakeError>;
