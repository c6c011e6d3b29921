//! Text normalization for incoming runs
//!
//! Readers report explicit breaks in many forms: CR/LF pairs, bare CR, form
//! feeds, the Unicode line and paragraph separators, and sometimes a literal
//! backslash-n escape that survived an upstream serialization. All of them
//! become `\n`, and the result is NFC-composed.

use unicode_normalization::UnicodeNormalization;

/// Normalize line break forms to `\n` and compose to NFC.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{000C}' | '\u{2028}' | '\u{2029}' => out.push('\n'),
            '\\' if chars.peek() == Some(&'n') => {
                chars.next();
                out.push('\n');
            }
            _ => out.push(ch),
        }
    }
    out.nfc().collect()
}

/// Whether the text has nothing but whitespace.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_forms() {
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(normalize_text("a\u{2028}b\u{2029}c\u{000C}d"), "a\nb\nc\nd");
        assert_eq!(normalize_text("A\\nB"), "A\nB");
        // A lone backslash stays
        assert_eq!(normalize_text("C:\\temp"), "C:\\temp");
    }

    #[test]
    fn test_nfc_composition() {
        let decomposed = "e\u{0301}";
        assert_eq!(normalize_text(decomposed), "\u{00E9}");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" x "));
    }
}
