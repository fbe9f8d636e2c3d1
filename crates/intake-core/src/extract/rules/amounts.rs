//! Amount extraction: locale-aware number parsing, grand total and VAT amount.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::trace;

use super::patterns::{CURRENCY, MONEY, TOTAL_LABEL, VAT_LABEL};
use super::{ExtractionMatch, FieldExtractor};
use crate::extract::normalize::split_lines;

/// Money token extractor.
///
/// Finds every currency-shaped token and keeps those that parse; a token that
/// looks like money but does not parse is dropped silently.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        MONEY
            .captures_iter(text)
            .filter_map(|caps| {
                let token = caps.get(1)?;
                let amount = parse_amount(token.as_str())?;
                Some(
                    ExtractionMatch::new(amount, token.as_str())
                        .with_position(token.start(), token.end()),
                )
            })
            .collect()
    }
}

/// Amounts picked from an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceAmounts {
    /// Grand total, two fraction digits.
    pub total: Option<Decimal>,
    /// Whether the total came from a line labeled as a total.
    pub total_from_label: bool,
    /// VAT amount, two fraction digits.
    pub vat_amount: Option<Decimal>,
}

/// Extract the grand total and VAT amount from invoice text.
pub fn extract_amounts(text: &str) -> InvoiceAmounts {
    let extractor = AmountExtractor::new();

    let mut all = Vec::new();
    let mut labeled = Vec::new();
    let mut vat = Vec::new();

    for line in split_lines(text) {
        let values: Vec<Decimal> = extractor
            .extract_all(line)
            .into_iter()
            .map(|m| m.value)
            .collect();
        if values.is_empty() {
            continue;
        }

        trace!("Amounts {:?} on line {:?}", values, line);

        if TOTAL_LABEL.is_match(line) {
            labeled.extend_from_slice(&values);
        }
        if VAT_LABEL.is_match(line) {
            vat.extend_from_slice(&values);
        }
        all.extend(values);
    }

    let labeled_max = labeled.into_iter().max();
    let total_from_label = labeled_max.is_some();
    let total = labeled_max.or_else(|| all.into_iter().max());

    InvoiceAmounts {
        total: total.map(to_money),
        total_from_label,
        vat_amount: vat.into_iter().max().map(to_money),
    }
}

/// Extract the grand total.
///
/// The largest amount on a "total" line wins; without any such line the
/// largest amount anywhere in the text is used.
pub fn extract_total(text: &str) -> Option<Decimal> {
    extract_amounts(text).total
}

/// Extract the VAT amount: the largest amount on any line mentioning VAT or tax.
pub fn extract_vat_amount(text: &str) -> Option<Decimal> {
    extract_amounts(text).vat_amount
}

/// Parse an amount written in European or US notation.
///
/// Currency markers and whitespace are dropped first. Then:
/// - one comma and at least one period: periods group thousands, comma is decimal ("1.234,56");
/// - one comma and no period: comma is decimal ("10,00");
/// - otherwise the period is the decimal point.
///
/// Anything but digits and periods is removed before parsing.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let stripped = CURRENCY.replace_all(s, "");
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    let commas = compact.matches(',').count();
    let periods = compact.matches('.').count();

    let normalized = if commas == 1 && periods >= 1 {
        compact.replace('.', "").replace(',', ".")
    } else if commas == 1 {
        compact.replace(',', ".")
    } else {
        compact
    };

    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    Decimal::from_str(&cleaned).ok()
}

/// Round to cents and fix the scale at two fraction digits.
pub fn to_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_conventions() {
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("10,00"), Some(dec("10.00")));
        assert_eq!(parse_amount("1.234.567,89"), Some(dec("1234567.89")));
    }

    #[test]
    fn test_parse_amount_strips_currency() {
        assert_eq!(parse_amount("€ 121,00"), Some(dec("121.00")));
        assert_eq!(parse_amount("EUR 1.000,00"), Some(dec("1000.00")));
        assert_eq!(parse_amount("$ 99.95"), Some(dec("99.95")));
    }

    #[test]
    fn test_parse_amount_many_commas_are_dropped() {
        assert_eq!(parse_amount("1,234,567"), Some(dec("1234567")));
    }

    #[test]
    fn test_parse_amount_unparseable() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("1.000.00"), None);
    }

    #[test]
    fn test_to_money_two_digits() {
        assert_eq!(to_money(dec("1234567")).to_string(), "1234567.00");
        assert_eq!(to_money(dec("1.23456")).to_string(), "1.23");
        assert_eq!(to_money(dec("0.125")).to_string(), "0.13");
    }

    #[test]
    fn test_total_prefers_labeled_line() {
        let text = "Subtotal € 100,00\nVAT 21% € 21,00\nTotal Due € 121,00";
        let amounts = extract_amounts(text);
        assert_eq!(amounts.total.unwrap().to_string(), "121.00");
        assert!(amounts.total_from_label);
    }

    #[test]
    fn test_total_labeled_beats_larger_unlabeled() {
        let text = "Deposit € 500,00\nTotal € 121,00";
        assert_eq!(extract_total(text).unwrap().to_string(), "121.00");
    }

    #[test]
    fn test_total_falls_back_to_max() {
        let text = "Something\nLine item 1: € 10,00\nLine item 2: € 200,00";
        let amounts = extract_amounts(text);
        assert_eq!(amounts.total.unwrap().to_string(), "200.00");
        assert!(!amounts.total_from_label);
    }

    #[test]
    fn test_total_line_ends_at_carriage_return() {
        let text = "ACME BV\rSubtotal € 100,00\rTotal Due € 121,00\rDeposit € 500,00";
        let amounts = extract_amounts(text);
        assert_eq!(amounts.total.unwrap().to_string(), "121.00");
        assert!(amounts.total_from_label);
    }

    #[test]
    fn test_total_line_ends_at_form_feed() {
        let text = "Invoice\nTotal € 10,00\u{0c}Line item € 500,00";
        assert_eq!(extract_total(text).unwrap().to_string(), "10.00");
    }

    #[test]
    fn test_total_absent_without_amounts() {
        assert_eq!(extract_total("no money here\nat all"), None);
        assert_eq!(extract_total(""), None);
    }

    #[test]
    fn test_vat_amount_max_over_vat_lines() {
        let text = "VAT 9% € 4,50\nNet € 50,00\nVAT 21% € 21,00";
        assert_eq!(extract_vat_amount(text).unwrap().to_string(), "21.00");
    }

    #[test]
    fn test_vat_amount_absent() {
        assert_eq!(extract_vat_amount("Total € 10,00"), None);
        assert_eq!(extract_vat_amount("VAT No: NL123456789B01"), None);
    }

    #[test]
    fn test_extract_all_positions() {
        let extractor = AmountExtractor::new();
        let results = extractor.extract_all("Price: 100,00, Total: 1.234,56");

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].value, dec("1234.56"));
        assert_eq!(results[1].source, "1.234,56");
        assert_eq!(results[1].position, Some((22, 30)));
    }
}
