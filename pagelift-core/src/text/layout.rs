//! Horizontal alignment and indentation of a group of lines

use crate::page::TextLine;

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Thresholds for alignment detection, in page points unless noted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlignmentOptions {
    /// Max distance between block and page centres, as a share of page width
    pub center_tolerance_ratio: f64,
    /// Centred lines must be narrower than this share of the page width
    pub center_max_width_ratio: f64,
    /// Right-aligned lines end within this distance of the page edge
    pub right_margin_limit: f64,
    /// ...and start further right than this
    pub right_min_left: f64,
    /// Left edges beyond this become an indent
    pub indent_threshold: f64,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            center_tolerance_ratio: 0.1,
            center_max_width_ratio: 0.7,
            right_margin_limit: 50.0,
            right_min_left: 100.0,
            indent_threshold: 20.0,
        }
    }
}

/// Alignment and indent magnitude of `lines` on a page `page_width` wide.
///
/// An unknown (non-positive) page width always yields left alignment.
pub fn detect_layout(lines: &[&TextLine], page_width: f64, options: &AlignmentOptions) -> (Alignment, f64) {
    if lines.is_empty() {
        return (Alignment::Left, 0.0);
    }
    let n = lines.len() as f64;
    let avg_left = lines.iter().map(|l| l.bbox.x0).sum::<f64>() / n;
    let avg_right = lines.iter().map(|l| l.bbox.x1).sum::<f64>() / n;
    let avg_width = lines.iter().map(|l| l.bbox.width()).sum::<f64>() / n;

    if page_width > 0.0 {
        let block_center = (avg_left + avg_right) / 2.0;
        let page_center = page_width / 2.0;
        if (block_center - page_center).abs() < page_width * options.center_tolerance_ratio
            && avg_width < page_width * options.center_max_width_ratio
        {
            return (Alignment::Center, 0.0);
        }
        if page_width - avg_right < options.right_margin_limit && avg_left > options.right_min_left {
            return (Alignment::Right, 0.0);
        }
    }

    let indent = if avg_left > options.indent_threshold { avg_left } else { 0.0 };
    (Alignment::Left, indent)
}
