//! Invoice field extraction.
//!
//! Text goes through [`normalize`] and then through independent rule
//! extractors (identifiers, date, amounts, vendor); [`HeuristicFieldParser`]
//! composes their outputs into one [`ExtractedFields`](crate::models::ExtractedFields)
//! record. Everything here is pure and safe to call from many threads.

pub mod normalize;
mod parser;
pub mod rules;

pub use parser::{extract_fields, ExtractionResult, FieldParser, HeuristicFieldParser};
