//! Integration tests for paragraph segmentation

use pagelift::geometry::Rect;
use pagelift::text::{Alignment, BreakReason, ParagraphStyle};
use pagelift::{ContentBlock, ParagraphSegmenter, SegmenterOptions, TextLine, TextSpan};
use pretty_assertions::assert_eq;

const LINE_HEIGHT: f64 = 10.0;
const PAGE_WIDTH: f64 = 600.0;

/// Lines at `x0` whose tops follow from the given gaps.
fn lines_with_gaps(x0: f64, gaps: &[f64]) -> Vec<TextLine> {
    let mut y = 100.0;
    let mut lines = vec![TextLine::new(Rect::new(x0, y, x0 + 300.0, y + LINE_HEIGHT), "line 0")];
    for (i, gap) in gaps.iter().enumerate() {
        y += LINE_HEIGHT + gap;
        lines.push(TextLine::new(
            Rect::new(x0, y, x0 + 300.0, y + LINE_HEIGHT),
            &format!("line {}", i + 1),
        ));
    }
    lines
}

fn segment(lines: Vec<TextLine>) -> Vec<pagelift::Paragraph> {
    ParagraphSegmenter::default().segment(&ContentBlock::from_lines(lines), PAGE_WIDTH)
}

#[test]
fn test_average_gap_keeps_one_paragraph() {
    let paragraphs = segment(lines_with_gaps(72.0, &[4.0; 11]));
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].lines().len(), 12);
}

#[test]
fn test_double_gap_splits() {
    let mut gaps = vec![4.0; 10];
    gaps.push(8.0);
    let paragraphs = segment(lines_with_gaps(72.0, &gaps));

    assert_eq!(paragraphs.len(), 2);
    assert_eq!(paragraphs[0].lines().len(), 11);
    assert_eq!(paragraphs[1].lines(), vec!["line 11"]);
    assert!(paragraphs[1].opened_by.contains(BreakReason::VERTICAL_GAP));
}

#[test]
fn test_two_lines_at_average_gap() {
    let paragraphs = segment(lines_with_gaps(72.0, &[6.0]));
    assert_eq!(paragraphs.len(), 1);
}

#[test]
fn test_embedded_break_stays_in_paragraph() {
    for text in ["A\nB", "A\r\nB", "A\rB", "A\u{2028}B", "A\\nB"] {
        let line = TextLine::new(Rect::new(72.0, 100.0, 300.0, 110.0), text);
        let paragraphs = segment(vec![line]);
        assert_eq!(paragraphs.len(), 1, "input {text:?}");
        assert_eq!(paragraphs[0].lines(), vec!["A", "B"], "input {text:?}");
    }
}

#[test]
fn test_no_blank_lines_rendered() {
    let line = TextLine::new(Rect::new(72.0, 100.0, 300.0, 110.0), "\n\nfirst\n\n\nsecond\n");
    let paragraphs = segment(vec![line]);
    assert_eq!(paragraphs[0].text(), "first\nsecond");
}

#[test]
fn test_sentence_end_then_capital() {
    let mut lines = lines_with_gaps(72.0, &[4.0, 4.0]);
    lines[0].text = "the end of a thought.".to_string();
    lines[1].text = "Another one begins".to_string();
    lines[2].text = "and continues".to_string();

    let paragraphs = segment(lines);
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(paragraphs[1].text(), "Another one begins\nand continues");
    assert!(paragraphs[1].opened_by.contains(BreakReason::SENTENCE_END));
}

#[test]
fn test_sentence_end_then_lowercase_continues() {
    let mut lines = lines_with_gaps(72.0, &[4.0]);
    lines[0].text = "version 2.".to_string();
    lines[1].text = "continues here".to_string();
    assert_eq!(segment(lines).len(), 1);
}

#[test]
fn test_cjk_sentence_end() {
    let mut lines = lines_with_gaps(72.0, &[4.0]);
    lines[0].text = "第一句。".to_string();
    lines[1].text = "Next".to_string();
    assert_eq!(segment(lines).len(), 2);
}

#[test]
fn test_heading_from_font_size() {
    let line = TextLine::new(Rect::new(72.0, 100.0, 300.0, 120.0), "Introduction").with_font(18.0, true);
    let paragraphs = segment(vec![line]);
    assert_eq!(paragraphs[0].style, ParagraphStyle::Heading);
    assert!(paragraphs[0].is_heading());
}

#[test]
fn test_heading_from_span_font_size() {
    let bbox = Rect::new(72.0, 100.0, 300.0, 120.0);
    let line = TextLine::new(bbox, "Chapter 1").with_spans(vec![TextSpan::new(bbox, "Chapter 1", 16.0, false)]);
    assert_eq!(segment(vec![line])[0].style, ParagraphStyle::Heading);
}

#[test]
fn test_tagged_heading_block() {
    let block = ContentBlock::from_lines(lines_with_gaps(72.0, &[])).with_heading_tag(true);
    let paragraphs = ParagraphSegmenter::default().segment(&block, PAGE_WIDTH);
    assert_eq!(paragraphs[0].style, ParagraphStyle::Heading);
}

#[test]
fn test_list_styles_win_over_heading() {
    let bullet = TextLine::new(Rect::new(72.0, 100.0, 300.0, 120.0), "• first point").with_font(18.0, false);
    assert_eq!(segment(vec![bullet])[0].style, ParagraphStyle::ListBullet);

    let numbered = TextLine::new(Rect::new(72.0, 100.0, 300.0, 110.0), "2) second point");
    assert_eq!(segment(vec![numbered])[0].style, ParagraphStyle::ListNumber);

    let not_a_list = TextLine::new(Rect::new(72.0, 100.0, 300.0, 110.0), "2024 was a year");
    assert_eq!(segment(vec![not_a_list])[0].style, ParagraphStyle::Body);
}

#[test]
fn test_list_items_split_when_enabled() {
    let mut lines = lines_with_gaps(72.0, &[4.0, 4.0]);
    lines[0].text = "- apples".to_string();
    lines[1].text = "- pears".to_string();
    lines[2].text = "- plums".to_string();

    let joined = ParagraphSegmenter::default().segment(&ContentBlock::from_lines(lines.clone()), PAGE_WIDTH);
    assert_eq!(joined.len(), 1);

    let segmenter = ParagraphSegmenter::new(SegmenterOptions::default().with_split_list_items(true));
    let split = segmenter.segment(&ContentBlock::from_lines(lines), PAGE_WIDTH);
    assert_eq!(split.len(), 3);
    assert!(split.iter().all(|p| p.style == ParagraphStyle::ListBullet));
    assert!(split[2].opened_by.contains(BreakReason::LIST_ITEM));
}

#[test]
fn test_alignment_detection() {
    let centered = TextLine::new(Rect::new(250.0, 100.0, 350.0, 110.0), "Title");
    assert_eq!(segment(vec![centered])[0].alignment, Alignment::Center);

    let right = TextLine::new(Rect::new(420.0, 100.0, 575.0, 110.0), "Signed");
    assert_eq!(segment(vec![right])[0].alignment, Alignment::Right);

    let indented = segment(lines_with_gaps(72.0, &[4.0]));
    assert_eq!(indented[0].alignment, Alignment::Left);
    assert_eq!(indented[0].indent, 72.0);
}

#[test]
fn test_segment_page_skips_excluded_blocks_and_orders_by_top() {
    let lower = ContentBlock::from_lines(vec![TextLine::new(Rect::new(72.0, 500.0, 300.0, 510.0), "lower")]);
    let upper = ContentBlock::from_lines(vec![TextLine::new(Rect::new(72.0, 100.0, 300.0, 110.0), "upper")]);
    let in_table =
        ContentBlock::from_lines(vec![TextLine::new(Rect::new(80.0, 300.0, 200.0, 310.0), "cell")]);

    let exclusions = [Rect::new(50.0, 250.0, 400.0, 400.0)];
    let paragraphs =
        ParagraphSegmenter::default().segment_page(&[lower, in_table, upper], PAGE_WIDTH, &exclusions);

    let texts: Vec<String> = paragraphs.iter().map(|p| p.text()).collect();
    assert_eq!(texts, vec!["upper".to_string(), "lower".to_string()]);
}

#[test]
fn test_empty_block_yields_nothing() {
    let block = ContentBlock::from_lines(vec![TextLine::new(Rect::new(72.0, 100.0, 300.0, 110.0), "  ")]);
    assert!(ParagraphSegmenter::default().segment(&block, PAGE_WIDTH).is_empty());
}

#[test]
fn test_indent_tolerance_option() {
    let mut lines = lines_with_gaps(72.0, &[4.0]);
    lines[1].bbox.x0 = 80.0;
    assert_eq!(segment(lines.clone()).len(), 1);

    let strict = ParagraphSegmenter::new(SegmenterOptions::default().with_indent_tolerance(5.0));
    let paragraphs = strict.segment(&ContentBlock::from_lines(lines), PAGE_WIDTH);
    assert_eq!(paragraphs.len(), 2);
    assert!(paragraphs[1].opened_by.contains(BreakReason::INDENT_SHIFT));
}

#[test]
fn test_default_gap_used_without_samples() {
    // A gap of 40 falls outside the sample range, so the fallback average decides
    let lines = lines_with_gaps(72.0, &[40.0]);
    assert_eq!(segment(lines.clone()).len(), 2);

    let wide = ParagraphSegmenter::new(SegmenterOptions::default().with_default_gap(30.0));
    assert_eq!(wide.average_gap(&lines), 30.0);
    assert_eq!(wide.segment(&ContentBlock::from_lines(lines), PAGE_WIDTH).len(), 1);
}

#[test]
fn test_heading_font_size_option() {
    let line = TextLine::new(Rect::new(72.0, 100.0, 300.0, 112.0), "Overview").with_font(12.0, false);
    assert_eq!(segment(vec![line.clone()])[0].style, ParagraphStyle::Body);

    let small_headings = ParagraphSegmenter::new(SegmenterOptions::default().with_heading_font_size(11.0));
    let paragraphs = small_headings.segment(&ContentBlock::from_lines(vec![line]), PAGE_WIDTH);
    assert_eq!(paragraphs[0].style, ParagraphStyle::Heading);
}
