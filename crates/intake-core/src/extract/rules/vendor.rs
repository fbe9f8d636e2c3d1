//! Vendor name heuristic.

use crate::extract::normalize::content_lines;

/// Longest line accepted as a vendor name, in characters.
pub const VENDOR_MAX_LINE_CHARS: usize = 80;

/// Pick the vendor for a document.
///
/// A non-empty hint (usually the sender) is returned verbatim. Otherwise the
/// first non-empty line of at most `max_line_chars` characters is used. This
/// is best effort: letterheads often start with a logo caption or address.
pub fn extract_vendor(text: &str, hint: Option<&str>, max_line_chars: usize) -> Option<String> {
    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        return Some(hint.to_string());
    }

    content_lines(text)
        .find(|line| line.chars().count() <= max_line_chars)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_wins() {
        let text = "ACME Consulting BV\nInvoice";
        assert_eq!(
            extract_vendor(text, Some("billing@acme.example"), VENDOR_MAX_LINE_CHARS),
            Some("billing@acme.example".to_string())
        );
    }

    #[test]
    fn test_hint_kept_verbatim() {
        assert_eq!(
            extract_vendor("", Some("  Spaced Name "), VENDOR_MAX_LINE_CHARS),
            Some("  Spaced Name ".to_string())
        );
    }

    #[test]
    fn test_empty_hint_falls_back() {
        assert_eq!(
            extract_vendor("\n  ACME BV \n", Some(""), VENDOR_MAX_LINE_CHARS),
            Some("ACME BV".to_string())
        );
    }

    #[test]
    fn test_line_ends_at_carriage_return() {
        assert_eq!(
            extract_vendor("ACME BV\rSubtotal € 100,00", None, VENDOR_MAX_LINE_CHARS),
            Some("ACME BV".to_string())
        );
    }

    #[test]
    fn test_skips_long_lines() {
        let long = "x".repeat(81);
        let text = format!("{long}\nShort Vendor Ltd");
        assert_eq!(
            extract_vendor(&text, None, VENDOR_MAX_LINE_CHARS),
            Some("Short Vendor Ltd".to_string())
        );
    }

    #[test]
    fn test_exact_limit_accepted() {
        let line = "é".repeat(80);
        assert_eq!(extract_vendor(&line, None, VENDOR_MAX_LINE_CHARS), Some(line.clone()));
    }

    #[test]
    fn test_absent_when_exhausted() {
        assert_eq!(extract_vendor("", None, VENDOR_MAX_LINE_CHARS), None);
        assert_eq!(extract_vendor(&"y".repeat(200), None, VENDOR_MAX_LINE_CHARS), None);
    }
}
