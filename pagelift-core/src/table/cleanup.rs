//! Cell text clean-up before a table is frozen

/// Longest text a word-processor table cell accepts.
pub const MAX_CELL_CHARS: usize = 32_767;

const ELLIPSIS: &str = "...";

/// Normalize whitespace and strip control characters from cell text.
///
/// Line breaks survive; runs of spaces collapse to one; control characters
/// other than `\n` and `\t` become spaces. Over-long text is truncated.
pub fn clean_cell_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut cleaned = String::with_capacity(unified.len());
    let mut last_was_space = false;
    for ch in unified.chars() {
        let ch = if ch.is_control() && ch != '\n' && ch != '\t' { ' ' } else { ch };
        if ch == ' ' {
            if !last_was_space {
                cleaned.push(' ');
            }
            last_was_space = true;
        } else {
            cleaned.push(ch);
            last_was_space = false;
        }
    }

    truncate_cell_text(cleaned.trim())
}

/// Cut text to [`MAX_CELL_CHARS`], ending with `...` when shortened.
pub fn truncate_cell_text(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }
    let keep = MAX_CELL_CHARS - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
