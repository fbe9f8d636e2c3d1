//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // VAT registration numbers: country prefix + digits, or a "VAT No" label
    pub static ref VAT_NUMBER: Regex = Regex::new(
        r"(?i)\b([A-Z]{2}\s?\d{8,12}|VAT\s?No\.?\s*[:#]?\s*[A-Z0-9\- ]{6,})\b"
    ).unwrap();

    // Company registration numbers (Chamber of Commerce / KvK / Company No)
    pub static ref COMPANY_NUMBER: Regex = Regex::new(
        r"(?i)\b(Chamber\s+of\s+Commerce\s*(?:No\.?|Number)?\s*[:#]?\s*\d{6,10}|KvK\s*[:#]?\s*\d{6,10}|Company\s+No\.?\s*[:#]?\s*\d{6,10})\b"
    ).unwrap();

    // Lines that label a date
    pub static ref DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(invoice\s+date|date\s+of\s+issue|date)\b"
    ).unwrap();

    // Date-shaped tokens: YYYY-M-D, D-M-YY(YY), D Month YYYY
    pub static ref DATE_VALUE: Regex = Regex::new(
        r"\b(\d{4}[\-/]\d{1,2}[\-/]\d{1,2}|\d{1,2}[\-/]\d{1,2}[\-/]\d{2,4}|\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"^(\d{4})[\-/](\d{1,2})[\-/](\d{1,2})$"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[\-/](\d{1,2})[\-/](\d{2,4})$"
    ).unwrap();

    pub static ref DATE_LONG: Regex = Regex::new(
        r"^(\d{1,2})\s+([A-Za-z]{3,9})\s+(\d{4})$"
    ).unwrap();

    // Money tokens, optionally prefixed by a euro marker
    pub static ref MONEY: Regex = Regex::new(
        r"(?:(?:EUR|€)\s*)?(\d+(?:[.,]\d{3})*[.,]\d{2})"
    ).unwrap();

    // Lines carrying the grand total
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(total\s+due|amount\s+due|grand\s+total|total)\b"
    ).unwrap();

    // Lines carrying a VAT / tax amount
    pub static ref VAT_LABEL: Regex = Regex::new(
        r"(?i)\bvat\b|\btax\b"
    ).unwrap();

    // Currency markers stripped before numeric parsing
    pub static ref CURRENCY: Regex = Regex::new(
        r"(?i)EUR|USD|GBP|€|\$|£"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtotal_is_not_a_total_label() {
        assert!(!TOTAL_LABEL.is_match("Subtotal € 100,00"));
        assert!(TOTAL_LABEL.is_match("Total Due € 121,00"));
        assert!(TOTAL_LABEL.is_match("GRAND TOTAL 5.00"));
    }

    #[test]
    fn test_vat_label_needs_word_boundary() {
        assert!(VAT_LABEL.is_match("VAT 21%"));
        assert!(VAT_LABEL.is_match("Sales tax"));
        assert!(!VAT_LABEL.is_match("Taxi ride"));
        assert!(!VAT_LABEL.is_match("private"));
    }

    #[test]
    fn test_money_requires_two_decimals() {
        let tokens: Vec<&str> = MONEY
            .captures_iter("€ 1.234,56 and 1234.56 and 17")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(tokens, vec!["1.234,56", "1234.56"]);
    }

    #[test]
    fn test_date_value_shapes() {
        assert!(DATE_VALUE.is_match("2026-02-01"));
        assert!(DATE_VALUE.is_match("01/02/26"));
        assert!(DATE_VALUE.is_match("1 February 2026"));
        assert!(!DATE_VALUE.is_match("INV-1001"));
    }
}
