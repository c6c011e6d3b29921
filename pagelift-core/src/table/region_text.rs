//! Text extraction for a table region
//!
//! Fallback strategies only find a region; its contents must then be read
//! back from the page. Sources are tried from most to least structured:
//! per-line span text, block text, and finally plain text cut into evenly
//! spaced synthetic rows.

use super::builder::PositionedText;
use crate::geometry::{rects_overlap, Rect};
use crate::page::PageInput;
use tracing::trace;

/// Read access to the text of a page region.
pub trait RegionTextSource {
    /// One item per line with span data whose centre lies in `region`.
    fn line_items_in(&self, region: &Rect) -> Vec<PositionedText>;

    /// One item per block whose centre lies in `region`.
    fn block_items_in(&self, region: &Rect) -> Vec<PositionedText>;

    /// Unpositioned text of everything touching `region`, lines separated by `\n`.
    fn plain_text_in(&self, region: &Rect) -> String;
}

impl RegionTextSource for PageInput {
    fn line_items_in(&self, region: &Rect) -> Vec<PositionedText> {
        self.lines()
            .filter(|line| region.contains_point(line.bbox.center()))
            .filter_map(|line| {
                let text = line.span_text()?;
                Some(PositionedText::new(line.bbox, text).with_font(line.max_font_size(), line.is_bold))
            })
            .collect()
    }

    fn block_items_in(&self, region: &Rect) -> Vec<PositionedText> {
        self.blocks
            .iter()
            .filter(|block| region.contains_point(block.bbox.center()))
            .map(|block| PositionedText::new(block.bbox, block.text()))
            .collect()
    }

    fn plain_text_in(&self, region: &Rect) -> String {
        self.lines()
            .filter(|line| rects_overlap(&line.bbox, region))
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Positioned text of `region`, taken from the richest source that has any.
pub fn extract_region_text<S: RegionTextSource + ?Sized>(source: &S, region: &Rect) -> Vec<PositionedText> {
    let items = non_blank(source.line_items_in(region));
    if !items.is_empty() {
        trace!(count = items.len(), "region text from line spans");
        return items;
    }

    let items = non_blank(source.block_items_in(region));
    if !items.is_empty() {
        trace!(count = items.len(), "region text from blocks");
        return items;
    }

    let items = split_plain_text(&source.plain_text_in(region), region);
    trace!(count = items.len(), "region text from plain text");
    items
}

/// Cut plain text into rows, giving each line an equal share of the region height.
pub fn split_plain_text(text: &str, region: &Rect) -> Vec<PositionedText> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let row_height = region.height() / lines.len() as f64;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let y0 = region.y0 + row_height * i as f64;
            PositionedText::new(Rect::new(region.x0, y0, region.x1, y0 + row_height), *line)
        })
        .collect()
}

fn non_blank(items: Vec<PositionedText>) -> Vec<PositionedText> {
    items.into_iter().filter(|i| !i.text.trim().is_empty()).collect()
}
