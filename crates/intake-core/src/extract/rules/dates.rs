//! Invoice date extraction.

use chrono::NaiveDate;
use tracing::debug;

use super::patterns::{DATE_DMY, DATE_LABEL, DATE_LONG, DATE_VALUE, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};
use crate::extract::normalize::split_lines;

/// Date field extractor.
///
/// Yields every date-shaped token that parses, in text order.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_VALUE.captures_iter(text).find_map(|caps| to_match(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_VALUE
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps))
            .collect()
    }
}

fn to_match(caps: &regex::Captures<'_>) -> Option<ExtractionMatch<NaiveDate>> {
    let token = caps.get(1)?;
    let date = parse_date_token(token.as_str())?;
    Some(ExtractionMatch::new(date, token.as_str()).with_position(token.start(), token.end()))
}

/// Extract the invoice date from document text.
///
/// Lines carrying a date label ("Invoice date", "Date of issue", "Date") are
/// tried first, in order, using the first date-shaped token on each. A labeled
/// line whose token does not parse is skipped rather than ending the search.
/// Without a labeled hit, the first parseable date anywhere in the text wins.
pub fn extract_invoice_date(text: &str) -> Option<NaiveDate> {
    let labeled = split_lines(text)
        .map(str::trim)
        .filter(|line| !line.is_empty() && DATE_LABEL.is_match(line));

    for line in labeled {
        let Some(token) = DATE_VALUE.captures(line).and_then(|caps| caps.get(1)) else {
            continue;
        };
        match parse_date_token(token.as_str()) {
            Some(date) => return Some(date),
            None => debug!("Unparseable date {:?} on labeled line", token.as_str()),
        }
    }

    DateExtractor::new().extract(text).map(|m| m.value)
}

/// Parse a single date-shaped token.
///
/// Tokens starting with a four-digit year are read year-month-day. Short
/// numeric dates are read day-first; if the second number cannot be a month
/// but the first can, they are read month-first instead.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim();

    if let Some(caps) = DATE_YMD.captures(token) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DMY.captures(token) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;

        let (day, month) = if first > 12 || second <= 12 {
            (first, second)
        } else {
            (second, first)
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_LONG.captures(token) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Highest two-digit year read as 20xx; anything above is read as 19xx.
///
/// Fixed rather than relative to today so the same text always yields the
/// same date.
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() <= 2 {
        Some(if year <= TWO_DIGIT_YEAR_PIVOT {
            2000 + year
        } else {
            1900 + year
        })
    } else {
        Some(year)
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(parse_date_token("2026-02-01"), Some(date(2026, 2, 1)));
        assert_eq!(parse_date_token("2026/2/1"), Some(date(2026, 2, 1)));
    }

    #[test]
    fn test_parse_day_first() {
        assert_eq!(parse_date_token("01-02-2026"), Some(date(2026, 2, 1)));
        assert_eq!(parse_date_token("15/01/2024"), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_parse_swaps_when_second_is_not_a_month() {
        assert_eq!(parse_date_token("02/25/2026"), Some(date(2026, 2, 25)));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse_date_token("15.01.24"), None);
        assert_eq!(parse_date_token("15/01/24"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date_token("15/01/99"), Some(date(1999, 1, 15)));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        let pivot = TWO_DIGIT_YEAR_PIVOT;
        assert_eq!(parse_year(&format!("{:02}", pivot)), Some(2000 + pivot));
        assert_eq!(parse_year(&format!("{:02}", pivot + 1)), Some(1900 + pivot + 1));
        assert_eq!(parse_year("00"), Some(2000));
        assert_eq!(parse_year("2060"), Some(2060));
    }

    #[test]
    fn test_parse_long_form() {
        assert_eq!(parse_date_token("1 February 2026"), Some(date(2026, 2, 1)));
        assert_eq!(parse_date_token("9 sept 2025"), Some(date(2025, 9, 9)));
        assert_eq!(parse_date_token("15 Invoice 2024"), None);
    }

    #[test]
    fn test_parse_invalid_calendar_date() {
        assert_eq!(parse_date_token("31/02/2026"), None);
        assert_eq!(parse_date_token("2026-13-01"), None);
    }

    #[test]
    fn test_labeled_line_preferred() {
        let text = "Order placed 2025-12-01\nInvoice Date: 2026-02-01";
        assert_eq!(extract_invoice_date(text), Some(date(2026, 2, 1)));
    }

    #[test]
    fn test_unparseable_labeled_date_falls_through_to_global_scan() {
        let text = "Invoice date: 31/02/2026\nDelivered 2026-03-05";
        assert_eq!(extract_invoice_date(text), Some(date(2026, 3, 5)));
    }

    #[test]
    fn test_unparseable_labeled_date_tries_next_labeled_line() {
        let text = "Order 2025-12-01\nDate: 31/02/2026\nInvoice date: 2026-01-10";
        assert_eq!(extract_invoice_date(text), Some(date(2026, 1, 10)));
    }

    #[test]
    fn test_labeled_line_ends_at_carriage_return() {
        let text = "Order 2025-12-01\rInvoice Date: 2026-02-01";
        assert_eq!(extract_invoice_date(text), Some(date(2026, 2, 1)));
    }

    #[test]
    fn test_labeled_line_without_date() {
        let text = "Date\n5 March 2026";
        assert_eq!(extract_invoice_date(text), Some(date(2026, 3, 5)));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_invoice_date("Invoice No: INV-1001"), None);
        assert_eq!(extract_invoice_date(""), None);
    }

    #[test]
    fn test_extract_all_skips_invalid() {
        let extractor = DateExtractor::new();
        let dates: Vec<NaiveDate> = extractor
            .extract_all("31/02/2026, 2026-03-05 and 7 May 2026")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(dates, vec![date(2026, 3, 5), date(2026, 5, 7)]);
    }
}
