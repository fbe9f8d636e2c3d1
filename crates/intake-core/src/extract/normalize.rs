//! Text normalization ahead of pattern search.

use tracing::warn;

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Identifier patterns run on this form so that OCR line breaks inside a
/// "VAT No" or "Chamber of Commerce" label do not split the match.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `c` ends a line.
///
/// Besides `\n` and `\r` this covers the vertical tab, form feed, the
/// file/group/record separators, NEL and the Unicode line and paragraph
/// separators. OCR and PDF text dumps use form feeds between pages.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Iterator over the lines of a text, see [`split_lines`].
#[derive(Debug, Clone)]
pub struct SplitLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.char_indices().find(|(_, c)| is_line_break(*c)) {
            Some((idx, c)) => {
                let line = &self.rest[..idx];
                let mut end = idx + c.len_utf8();
                if c == '\r' && self.rest[end..].starts_with('\n') {
                    end += 1;
                }
                self.rest = &self.rest[end..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

/// Split text into lines on every line break character, not only `\n`.
///
/// `\r\n` counts as one break and a trailing break does not produce an
/// empty last line.
pub fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: text }
}

/// Non-empty, trimmed lines in original order.
pub fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    split_lines(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Cut `text` to at most `max_chars` characters, on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            warn!(
                "Input text truncated to {} of {} characters",
                max_chars,
                text.chars().count()
            );
            &text[..idx]
        }
        None => text,
    }
}
