//! File name helpers for output artifacts.

use lazy_static::lazy_static;
use regex::Regex;

/// Longest file name produced by [`safe_filename`], in characters.
pub const MAX_FILENAME_CHARS: usize = 180;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|]+"#).unwrap();
}

/// Make `name` safe to use as a file name on common file systems.
pub fn safe_filename(name: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(name, "_");
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_FILENAME_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_characters_replaced() {
        assert_eq!(safe_filename(r#"Invoice 2026/02: "ACME"?.pdf"#), "Invoice 2026_02_ _ACME_.pdf");
        assert_eq!(safe_filename(r"a\\b<>c"), "a_b_c");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(safe_filename("  Re:   invoice\tFebruary \n"), "Re_ invoice February");
    }

    #[test]
    fn test_length_limit() {
        let long = "é".repeat(300);
        assert_eq!(safe_filename(&long).chars().count(), MAX_FILENAME_CHARS);
        assert_eq!(safe_filename("short.pdf"), "short.pdf");
    }
}
