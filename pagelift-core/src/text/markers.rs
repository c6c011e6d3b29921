//! List marker detection

use lazy_static::lazy_static;
use regex::Regex;

/// Characters that open a bulleted list item.
pub const BULLET_MARKERS: &[char] = &['-', '•', '·', '○', '□', '■', '►', '▪', '◆'];

lazy_static! {
    static ref NUMBERED_MARKER: Regex =
        Regex::new(r"^\s*(\d{1,2})[.、)]").expect("valid numbered marker regex");
}

/// A list marker found at the start of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet(char),
    Numbered(u32),
}

/// Detect a bullet or a one/two digit number followed by `.`, `、` or `)`.
pub fn detect_list_marker(text: &str) -> Option<ListMarker> {
    let first = text.trim_start().chars().next()?;
    if BULLET_MARKERS.contains(&first) {
        return Some(ListMarker::Bullet(first));
    }
    NUMBERED_MARKER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map(ListMarker::Numbered)
}
