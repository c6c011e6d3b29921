//! Paragraph segmentation from line geometry
//!
//! The reader groups text into blocks of visual lines but says nothing about
//! where one paragraph ends and the next begins. [`ParagraphSegmenter`]
//! recovers those boundaries from indentation shifts, vertical spacing,
//! blank lines and sentence ends, then classifies each paragraph as body
//! text, heading or list item.
//!
//! # Example
//!
//! ```rust
//! use pagelift::geometry::Rect;
//! use pagelift::page::{ContentBlock, TextLine};
//! use pagelift::text::{ParagraphSegmenter, Segment, SegmenterOptions};
//!
//! let block = ContentBlock::from_lines(vec![TextLine::new(
//!     Rect::new(72.0, 100.0, 300.0, 112.0),
//!     "first\nsecond",
//! )]);
//!
//! let segmenter = ParagraphSegmenter::new(SegmenterOptions::default());
//! let paragraphs = segmenter.segment(&block, 612.0);
//! assert_eq!(paragraphs.len(), 1);
//! assert_eq!(paragraphs[0].segments[1], Segment::LineBreak);
//! ```

use super::layout::{detect_layout, Alignment, AlignmentOptions};
use super::markers::{detect_list_marker, ListMarker};
use crate::geometry::{union_all, Rect};
use crate::page::{ContentBlock, TextLine};
use bitflags::bitflags;
use tracing::{debug, trace};

const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', '。', '！', '？'];

bitflags! {
    /// Why a paragraph was started.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct BreakReason: u8 {
        /// First line of the block
        const BLOCK_START = 1 << 0;
        /// Left edge moved more than the indent tolerance
        const INDENT_SHIFT = 1 << 1;
        /// Gap to the previous line exceeded the paragraph spacing
        const VERTICAL_GAP = 1 << 2;
        /// The line is empty
        const BLANK_LINE = 1 << 3;
        /// Previous text ended a sentence and this line starts uppercase
        const SENTENCE_END = 1 << 4;
        /// The line opens a list item
        const LIST_ITEM = 1 << 5;
    }
}

/// Options for paragraph segmentation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmenterOptions {
    /// Left-edge shift that starts a new paragraph
    pub indent_tolerance: f64,
    /// Gap multiple of the block average that starts a new paragraph
    pub spacing_factor: f64,
    /// Gap samples outside `(min, max)` are ignored when averaging
    pub gap_sample_min: f64,
    pub gap_sample_max: f64,
    /// Average gap used when no sample qualifies
    pub default_gap: f64,
    /// Font size above which a block is a heading
    pub heading_font_size: f64,
    /// Start a new paragraph at every list marker, not only at geometric breaks
    pub split_list_items: bool,
    pub alignment: AlignmentOptions,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            indent_tolerance: 10.0,
            spacing_factor: 1.8,
            gap_sample_min: 0.0,
            gap_sample_max: 30.0,
            default_gap: 12.0,
            heading_font_size: 14.0,
            split_list_items: false,
            alignment: AlignmentOptions::default(),
        }
    }
}

impl SegmenterOptions {
    pub fn with_indent_tolerance(mut self, tolerance: f64) -> Self {
        self.indent_tolerance = tolerance;
        self
    }

    pub fn with_spacing_factor(mut self, factor: f64) -> Self {
        self.spacing_factor = factor;
        self
    }

    pub fn with_default_gap(mut self, gap: f64) -> Self {
        self.default_gap = gap;
        self
    }

    pub fn with_heading_font_size(mut self, size: f64) -> Self {
        self.heading_font_size = size;
        self
    }

    pub fn with_split_list_items(mut self, split: bool) -> Self {
        self.split_list_items = split;
        self
    }
}

/// Paragraph style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParagraphStyle {
    #[default]
    Body,
    Heading,
    ListBullet,
    ListNumber,
}

/// A run of text or a forced line break inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    Text(String),
    LineBreak,
}

/// A reconstructed paragraph.
///
/// `segments` never starts or ends with a [`Segment::LineBreak`] and never
/// holds two in a row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Paragraph {
    pub segments: Vec<Segment>,
    pub alignment: Alignment,
    pub style: ParagraphStyle,
    pub indent: f64,
    pub bbox: Rect,
    pub opened_by: BreakReason,
}

impl Paragraph {
    /// Text with line breaks rendered as `\n`.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.as_str(),
                Segment::LineBreak => "\n",
            })
            .collect()
    }

    /// Text pieces between line breaks.
    pub fn lines(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.as_str()),
                Segment::LineBreak => None,
            })
            .collect()
    }

    pub fn is_heading(&self) -> bool {
        self.style == ParagraphStyle::Heading
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self.style, ParagraphStyle::ListBullet | ParagraphStyle::ListNumber)
    }
}

/// Splits blocks of lines into paragraphs.
#[derive(Debug, Clone, Default)]
pub struct ParagraphSegmenter {
    options: SegmenterOptions,
}

impl ParagraphSegmenter {
    pub fn new(options: SegmenterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SegmenterOptions {
        &self.options
    }

    /// Segment one block on a page `page_width` points wide.
    pub fn segment(&self, block: &ContentBlock, page_width: f64) -> Vec<Paragraph> {
        let lines = &block.lines;
        if lines.is_empty() {
            return Vec::new();
        }

        let avg_gap = self.average_gap(lines);
        let threshold = self.options.spacing_factor * avg_gap;
        let heading_block = block.tagged_heading
            || lines
                .iter()
                .any(|l| l.max_font_size() > self.options.heading_font_size);

        let mut groups: Vec<(BreakReason, Vec<&TextLine>)> = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let reason = match groups.last() {
                None => BreakReason::BLOCK_START,
                Some((_, group)) => self.break_reason(&lines[i - 1], line, group, threshold),
            };
            if reason.is_empty() {
                if let Some((_, group)) = groups.last_mut() {
                    group.push(line);
                }
            } else {
                trace!(?reason, line = %line.text, "paragraph break");
                groups.push((reason, vec![line]));
            }
        }

        let paragraphs: Vec<Paragraph> = groups
            .into_iter()
            .filter_map(|(reason, group)| self.build_paragraph(reason, &group, heading_block, page_width))
            .collect();

        debug!(lines = lines.len(), paragraphs = paragraphs.len(), avg_gap, "segmented block");
        paragraphs
    }

    /// Segment every block not covered by `exclusions`, top to bottom.
    ///
    /// A block is covered when more than half its area lies inside one
    /// excluded region.
    pub fn segment_page(&self, blocks: &[ContentBlock], page_width: f64, exclusions: &[Rect]) -> Vec<Paragraph> {
        let mut ordered: Vec<&ContentBlock> = blocks
            .iter()
            .filter(|b| !exclusions.iter().any(|ex| b.bbox.overlap_ratio(ex) > 0.5))
            .collect();
        ordered.sort_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0));

        ordered
            .into_iter()
            .flat_map(|b| self.segment(b, page_width))
            .collect()
    }

    /// Mean of consecutive line gaps inside the sample range.
    pub fn average_gap(&self, lines: &[TextLine]) -> f64 {
        let samples: Vec<f64> = lines
            .windows(2)
            .map(|w| w[1].bbox.y0 - w[0].bbox.y1)
            .filter(|g| *g > self.options.gap_sample_min && *g < self.options.gap_sample_max)
            .collect();
        if samples.is_empty() {
            self.options.default_gap
        } else {
            samples.iter().sum::<f64>() / samples.len() as f64
        }
    }

    fn break_reason(&self, prev: &TextLine, line: &TextLine, group: &[&TextLine], threshold: f64) -> BreakReason {
        let mut reason = BreakReason::empty();
        if (line.bbox.x0 - prev.bbox.x0).abs() > self.options.indent_tolerance {
            reason |= BreakReason::INDENT_SHIFT;
        }
        if line.bbox.y0 - prev.bbox.y1 > threshold {
            reason |= BreakReason::VERTICAL_GAP;
        }
        if line.is_blank() {
            reason |= BreakReason::BLANK_LINE;
        }
        if ends_sentence(group) && starts_uppercase(&line.text) {
            reason |= BreakReason::SENTENCE_END;
        }
        if self.options.split_list_items && detect_list_marker(&line.text).is_some() {
            reason |= BreakReason::LIST_ITEM;
        }
        reason
    }

    fn build_paragraph(
        &self,
        opened_by: BreakReason,
        group: &[&TextLine],
        heading_block: bool,
        page_width: f64,
    ) -> Option<Paragraph> {
        let content: Vec<&TextLine> = group.iter().copied().filter(|l| !l.is_blank()).collect();
        let segments = collect_segments(&content);
        let first_text = segments.iter().find_map(|s| match s {
            Segment::Text(t) => Some(t.as_str()),
            Segment::LineBreak => None,
        })?;

        let style = match detect_list_marker(first_text) {
            Some(ListMarker::Bullet(_)) => ParagraphStyle::ListBullet,
            Some(ListMarker::Numbered(_)) => ParagraphStyle::ListNumber,
            None if heading_block => ParagraphStyle::Heading,
            None => ParagraphStyle::Body,
        };
        let (alignment, indent) = detect_layout(&content, page_width, &self.options.alignment);
        let bbox = union_all(content.iter().map(|l| &l.bbox))?;

        Some(Paragraph {
            segments,
            alignment,
            style,
            indent,
            bbox,
            opened_by,
        })
    }
}

/// Text pieces of all lines, joined by single line breaks.
fn collect_segments(lines: &[&TextLine]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for line in lines {
        for piece in line.text.split('\n') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if !segments.is_empty() {
                segments.push(Segment::LineBreak);
            }
            segments.push(Segment::Text(piece.to_string()));
        }
    }
    segments
}

fn ends_sentence(group: &[&TextLine]) -> bool {
    group
        .iter()
        .rev()
        .find(|l| !l.is_blank())
        .and_then(|l| l.text.trim_end().chars().last())
        .is_some_and(|c| SENTENCE_ENDINGS.contains(&c))
}

fn starts_uppercase(text: &str) -> bool {
    text.trim_start().chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(x0: f64, y0: f64, text: &str) -> TextLine {
        TextLine::new(Rect::new(x0, y0, x0 + 200.0, y0 + 10.0), text)
    }

    fn segment(lines: Vec<TextLine>) -> Vec<Paragraph> {
        ParagraphSegmenter::default().segment(&ContentBlock::from_lines(lines), 0.0)
    }

    #[test]
    fn test_explicit_break_inside_line() {
        let paragraphs = segment(vec![line(50.0, 100.0, "A\nB")]);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(
            paragraphs[0].segments,
            vec![Segment::Text("A".into()), Segment::LineBreak, Segment::Text("B".into())]
        );
    }

    #[test]
    fn test_repeated_breaks_collapse() {
        let paragraphs = segment(vec![line(50.0, 100.0, "\nA\n\n\nB\n")]);
        assert_eq!(paragraphs[0].text(), "A\nB");
    }

    #[test]
    fn test_consecutive_lines_join_with_break() {
        let paragraphs = segment(vec![line(50.0, 100.0, "one"), line(50.0, 114.0, "two")]);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].lines(), vec!["one", "two"]);
        assert_eq!(paragraphs[0].opened_by, BreakReason::BLOCK_START);
    }

    #[test]
    fn test_indent_shift_breaks() {
        let paragraphs = segment(vec![line(50.0, 100.0, "one"), line(80.0, 114.0, "two")]);
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[1].opened_by.contains(BreakReason::INDENT_SHIFT));
    }

    #[test]
    fn test_small_indent_shift_is_tolerated() {
        let paragraphs = segment(vec![line(50.0, 100.0, "one"), line(58.0, 114.0, "two")]);
        assert_eq!(paragraphs.len(), 1);
    }

    #[test]
    fn test_blank_line_breaks() {
        let paragraphs = segment(vec![
            line(50.0, 100.0, "one"),
            line(50.0, 114.0, "   "),
            line(50.0, 128.0, "two"),
        ]);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].text(), "two");
        assert!(paragraphs[1].opened_by.contains(BreakReason::BLANK_LINE));
    }

    #[test]
    fn test_sentence_end_before_uppercase_breaks() {
        let paragraphs = segment(vec![
            line(50.0, 100.0, "it ends here."),
            line(50.0, 114.0, "Next thought"),
            line(50.0, 128.0, "continues."),
            line(50.0, 142.0, "lowercase follows"),
        ]);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].lines(), vec!["Next thought", "continues.", "lowercase follows"]);
    }

    #[test]
    fn test_cjk_sentence_end() {
        let paragraphs = segment(vec![line(50.0, 100.0, "结束了。"), line(50.0, 114.0, "Start")]);
        assert_eq!(paragraphs.len(), 2);
    }

    #[test]
    fn test_average_gap_ignores_outliers() {
        let segmenter = ParagraphSegmenter::default();
        let lines = vec![
            line(50.0, 100.0, "a"),
            line(50.0, 114.0, "b"),  // gap 4
            line(50.0, 200.0, "c"),  // gap 76, outlier
            line(50.0, 206.0, "d"),  // gap -4, overlapping
            line(50.0, 222.0, "e"),  // gap 6
        ];
        assert_eq!(segmenter.average_gap(&lines), 5.0);
        assert_eq!(segmenter.average_gap(&lines[..1]), 12.0);
    }

    #[test]
    fn test_heading_by_font_size() {
        let title = line(50.0, 100.0, "Title").with_font(18.0, true);
        let paragraphs = segment(vec![title]);
        assert_eq!(paragraphs[0].style, ParagraphStyle::Heading);
    }

    #[test]
    fn test_tagged_heading_block() {
        let block = ContentBlock::from_lines(vec![line(50.0, 100.0, "Quiet title")]).with_heading_tag(true);
        let paragraphs = ParagraphSegmenter::default().segment(&block, 0.0);
        assert!(paragraphs[0].is_heading());
    }

    #[test]
    fn test_list_style_wins_over_heading() {
        let item = line(50.0, 100.0, "• Large bullet").with_font(20.0, false);
        let paragraphs = segment(vec![item]);
        assert_eq!(paragraphs[0].style, ParagraphStyle::ListBullet);

        let numbered = segment(vec![line(50.0, 100.0, "2) second")]);
        assert_eq!(numbered[0].style, ParagraphStyle::ListNumber);
    }

    #[test]
    fn test_split_list_items_option() {
        let lines = vec![line(50.0, 100.0, "- first"), line(50.0, 114.0, "- second")];
        let block = ContentBlock::from_lines(lines);

        let joined = ParagraphSegmenter::default().segment(&block, 0.0);
        assert_eq!(joined.len(), 1);

        let split = ParagraphSegmenter::new(SegmenterOptions::default().with_split_list_items(true))
            .segment(&block, 0.0);
        assert_eq!(split.len(), 2);
        assert!(split[1].opened_by.contains(BreakReason::LIST_ITEM));
    }

    #[test]
    fn test_empty_block() {
        assert!(segment(vec![]).is_empty());
        assert!(segment(vec![line(50.0, 100.0, "  ")]).is_empty());
    }

    #[test]
    fn test_segment_page_skips_table_regions_and_orders_blocks() {
        let segmenter = ParagraphSegmenter::default();
        let lower = ContentBlock::from_lines(vec![line(50.0, 300.0, "lower")]);
        let upper = ContentBlock::from_lines(vec![line(50.0, 100.0, "upper")]);
        let in_table = ContentBlock::from_lines(vec![line(50.0, 200.0, "cell")]);
        let table_region = Rect::new(40.0, 190.0, 400.0, 250.0);

        let paragraphs = segmenter.segment_page(&[lower, in_table, upper], 600.0, &[table_region]);
        let texts: Vec<String> = paragraphs.iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["upper".to_string(), "lower".to_string()]);
    }
}
