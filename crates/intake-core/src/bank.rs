//! Bank statement parsing for monthly reconciliation.
//!
//! Statement exports differ per bank, so columns are found by header name
//! (English and Dutch) rather than by position.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::StatementError;
use crate::extract::normalize::collapse_whitespace;
use crate::extract::rules::parse_amount;

const DATE_HEADERS: &[&str] = &[
    "date",
    "datum",
    "booking date",
    "transaction date",
    "waarde",
    "valuta datum",
];
const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "omschrijving",
    "memo",
    "name",
    "tegenpartij",
    "counterparty",
    "payment",
];
const AMOUNT_HEADERS: &[&str] = &["amount", "bedrag", "debit", "credit", "amount (eur)", "af", "bij"];
const CURRENCY_HEADERS: &[&str] = &["currency", "valuta"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Column positions inferred from a statement header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
    pub currency: Option<usize>,
}

impl ColumnMap {
    /// Infer columns from headers. Candidates are tried in priority order and
    /// match when they occur anywhere in a (lower-cased) header.
    pub fn infer(headers: &[String]) -> Result<Self, StatementError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| collapse_whitespace(h).to_lowercase())
            .collect();

        let pick = |candidates: &[&str]| {
            candidates.iter().find_map(|candidate| {
                normalized.iter().position(|header| header.contains(candidate))
            })
        };

        match (pick(DATE_HEADERS), pick(DESCRIPTION_HEADERS), pick(AMOUNT_HEADERS)) {
            (Some(date), Some(description), Some(amount)) => Ok(Self {
                date,
                description,
                amount,
                currency: pick(CURRENCY_HEADERS),
            }),
            _ => Err(StatementError::MissingColumns {
                headers: headers.to_vec(),
            }),
        }
    }
}

/// One parsed statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankTransaction {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    /// The row as read.
    pub raw: Vec<String>,
}

/// Parse one statement row; blank rows yield `None`.
pub fn parse_row(record: &[String], columns: &ColumnMap) -> Option<BankTransaction> {
    if record.iter().all(|cell| cell.trim().is_empty()) {
        return None;
    }

    let cell = |idx: usize| record.get(idx).map(|s| s.trim()).unwrap_or("");

    Some(BankTransaction {
        date: parse_bank_date(cell(columns.date)),
        description: cell(columns.description).to_string(),
        amount: parse_signed_amount(cell(columns.amount)),
        currency: columns
            .currency
            .map(cell)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        raw: record.to_vec(),
    })
}

/// A parsed statement export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub columns: ColumnMap,
    pub transactions: Vec<BankTransaction>,
}

/// Parse a header row and its data rows.
pub fn parse_statement<I>(headers: &[String], rows: I) -> Result<Statement, StatementError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if headers.is_empty() {
        return Err(StatementError::Empty);
    }

    let columns = ColumnMap::infer(headers)?;
    debug!("Statement columns: {:?}", columns);

    let transactions = rows
        .into_iter()
        .filter_map(|row| parse_row(&row, &columns))
        .collect();

    Ok(Statement {
        columns,
        transactions,
    })
}

/// Parse a statement date in one of the common export formats.
pub fn parse_bank_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a statement amount, keeping the sign of debits.
pub fn parse_signed_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let amount = parse_amount(magnitude)?;
    Some(if negative { -amount } else { amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_english_columns() {
        let columns =
            ColumnMap::infer(&row(&["Booking Date", "Description", "Amount (EUR)", "Currency"]))
                .unwrap();
        assert_eq!(
            columns,
            ColumnMap {
                date: 0,
                description: 1,
                amount: 2,
                currency: Some(3),
            }
        );
    }

    #[test]
    fn test_infer_dutch_columns() {
        let columns = ColumnMap::infer(&row(&["Datum", "Naam / Omschrijving", "Af Bij", "Bedrag (EUR)"]))
            .unwrap();
        assert_eq!(columns.date, 0);
        assert_eq!(columns.description, 1);
        assert_eq!(columns.amount, 3);
        assert_eq!(columns.currency, None);
    }

    #[test]
    fn test_missing_columns_lists_headers() {
        let err = ColumnMap::infer(&row(&["Foo", "Bar"])).unwrap_err();
        match err {
            StatementError::MissingColumns { headers } => assert_eq!(headers, vec!["Foo", "Bar"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_statement() {
        let headers = row(&["Date", "Description", "Amount", "Currency"]);
        let rows = vec![
            row(&["2026-02-03", "ACME Consulting", "-121,00", "EUR"]),
            row(&["", " ", "", ""]),
            row(&["05/02/2026", "Refund", "1.000,50", ""]),
            row(&["yesterday", "Coffee"]),
        ];

        let txs = parse_statement(&headers, rows).unwrap().transactions;
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2026, 2, 3));
        assert_eq!(txs[0].amount, Some(Decimal::from_str("-121.00").unwrap()));
        assert_eq!(txs[0].currency.as_deref(), Some("EUR"));

        assert_eq!(txs[1].date, NaiveDate::from_ymd_opt(2026, 2, 5));
        assert_eq!(txs[1].amount, Some(Decimal::from_str("1000.50").unwrap()));
        assert_eq!(txs[1].currency, None);

        assert_eq!(txs[2].date, None);
        assert_eq!(txs[2].amount, None);
        assert_eq!(txs[2].description, "Coffee");
    }

    #[test]
    fn test_empty_headers() {
        assert!(matches!(
            parse_statement(&[], Vec::new()),
            Err(StatementError::Empty)
        ));
    }

    #[test]
    fn test_parse_bank_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 1);
        assert_eq!(parse_bank_date("2026-02-01"), expected);
        assert_eq!(parse_bank_date("01-02-2026"), expected);
        assert_eq!(parse_bank_date("01/02/2026"), expected);
        assert_eq!(parse_bank_date("2026/02/01"), expected);
        assert_eq!(parse_bank_date("Feb 1"), None);
        assert_eq!(parse_bank_date(""), None);
    }

    #[test]
    fn test_parse_signed_amount() {
        assert_eq!(parse_signed_amount("-12,50"), Some(Decimal::from_str("-12.50").unwrap()));
        assert_eq!(parse_signed_amount("+€ 7.00"), Some(Decimal::from_str("7.00").unwrap()));
        assert_eq!(parse_signed_amount(""), None);
    }
}
