//! Fallback table detectors
//!
//! Each detector looks at the page through a different lens and reports the
//! tables it believes in. They are tried in a fixed order by the resolver
//! and never combined.

use super::builder::{GridBuilder, PositionedText};
use super::region_text::extract_region_text;
use super::{TableDraft, TableList, TableOptions, TableSource};
use crate::error::{Defect, DefectKind, Validated};
use crate::geometry::union_all;
use crate::page::{ContentBlock, PageInput, TextLine};
use crate::raster::detect_regions;
use tracing::{debug, trace};

/// A strategy that finds tables without help from the primary detector.
pub trait TableDetector: Send + Sync {
    fn source(&self) -> TableSource;

    fn detect(&self, page: &PageInput, options: &TableOptions) -> Validated<TableList>;
}

/// Contours of ruled regions in the page rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterContourDetector;

impl TableDetector for RasterContourDetector {
    fn source(&self) -> TableSource {
        TableSource::RasterContour
    }

    fn detect(&self, page: &PageInput, options: &TableOptions) -> Validated<TableList> {
        let Some(raster) = page.raster.as_ref() else {
            trace!(page = page.page_number, "no page raster, skipping contour detection");
            return Validated::clean(TableList::empty());
        };
        if !(raster.scale.is_finite() && raster.scale > 0.0) {
            return Validated::new(
                TableList::empty(),
                vec![Defect::new(
                    DefectKind::MalformedGeometry,
                    format!("raster scale {}", raster.scale),
                )],
            );
        }

        let regions = detect_regions(&raster.image, options.binarize_threshold, options.min_contour_area);
        debug!(page = page.page_number, regions = regions.len(), "raster contours found");

        let builder = GridBuilder::new(options);
        let mut drafts = Vec::new();
        for region in regions {
            let rect = region.to_page(raster.scale);
            let items = extract_region_text(page, &rect);
            match builder.build(rect, &items, self.source()) {
                Some(draft) => drafts.push(draft),
                None => trace!(?rect, "contour region without text"),
            }
        }
        finalize_all(drafts, options, self.source())
    }
}

/// Runs of rows whose lines share a baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineAlignmentDetector;

impl TableDetector for LineAlignmentDetector {
    fn source(&self) -> TableSource {
        TableSource::LineAlignment
    }

    fn detect(&self, page: &PageInput, options: &TableOptions) -> Validated<TableList> {
        let mut lines: Vec<&TextLine> = page.lines().filter(|l| !l.is_blank()).collect();
        if lines.len() < options.min_page_lines {
            return Validated::clean(TableList::empty());
        }
        lines.sort_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0));

        let groups = group_rows(&lines, options.row_epsilon);
        let builder = GridBuilder::new(options);
        let mut drafts = Vec::new();

        for run in aligned_runs(&groups, options.min_row_groups, options.contiguous_row_runs) {
            let items: Vec<PositionedText> = run
                .iter()
                .flat_map(|group| group.iter())
                .map(|line| {
                    PositionedText::new(line.bbox, line.text.clone()).with_font(line.max_font_size(), line.is_bold)
                })
                .collect();
            let Some(bbox) = union_all(items.iter().map(|i| &i.bbox)) else {
                continue;
            };
            debug!(rows = run.len(), ?bbox, "aligned row run");
            if let Some(draft) = builder.build(bbox, &items, self.source()) {
                drafts.push(draft);
            }
        }
        finalize_all(drafts, options, self.source())
    }
}

/// Split y-sorted lines into rows; a line joins the current row while its
/// top is within `epsilon` of the row's first line.
fn group_rows<'a>(lines: &[&'a TextLine], epsilon: f64) -> Vec<Vec<&'a TextLine>> {
    let mut groups: Vec<Vec<&TextLine>> = Vec::new();
    for &line in lines {
        match groups.last_mut() {
            Some(group) if (line.bbox.y0 - group[0].bbox.y0).abs() < epsilon => group.push(line),
            _ => groups.push(vec![line]),
        }
    }
    groups
}

/// Sets of multi-item rows, each holding at least `min_rows` rows.
///
/// By default every multi-item row on the page belongs to one set, so a
/// sparse or spanning row inside a table does not split it. With
/// `contiguous` each maximal run of consecutive multi-item rows is its own
/// set.
fn aligned_runs<'g, 'a>(
    groups: &'g [Vec<&'a TextLine>],
    min_rows: usize,
    contiguous: bool,
) -> Vec<Vec<&'g [&'a TextLine]>> {
    let mut runs: Vec<Vec<&'g [&'a TextLine]>> = vec![Vec::new()];
    for group in groups {
        if group.len() > 1 {
            if let Some(run) = runs.last_mut() {
                run.push(group.as_slice());
            }
        } else if contiguous && runs.last().is_some_and(|run| !run.is_empty()) {
            runs.push(Vec::new());
        }
    }
    runs.retain(|run| !run.is_empty() && run.len() >= min_rows);
    runs
}

/// Blocks whose lines are evenly and tightly spaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthDetector;

impl RunLengthDetector {
    fn is_tabular(block: &ContentBlock, options: &TableOptions) -> bool {
        let lines = &block.lines;
        if lines.len() < options.min_run_lines.max(2) {
            return false;
        }
        let heights: Vec<f64> = lines[..lines.len() - 1].iter().map(|l| l.bbox.height()).collect();
        let gaps: Vec<f64> = lines.windows(2).map(|w| w[1].bbox.y0 - w[0].bbox.y1).collect();

        let max_gap = gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_gap = gaps.iter().copied().fold(f64::INFINITY, f64::min);
        let avg_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
        let avg_height = heights.iter().sum::<f64>() / heights.len() as f64;

        max_gap - min_gap < options.gap_variance_limit && avg_gap < avg_height * options.gap_to_height_ratio
    }
}

impl TableDetector for RunLengthDetector {
    fn source(&self) -> TableSource {
        TableSource::RunLength
    }

    fn detect(&self, page: &PageInput, options: &TableOptions) -> Validated<TableList> {
        let builder = GridBuilder::new(options);
        let drafts = page
            .blocks
            .iter()
            .filter(|block| Self::is_tabular(block, options))
            .filter_map(|block| {
                let items: Vec<PositionedText> = block
                    .lines
                    .iter()
                    .map(|l| PositionedText::new(l.bbox, l.text.clone()).with_font(l.max_font_size(), l.is_bold))
                    .collect();
                builder.single_column(block.bbox, &items, self.source())
            })
            .collect();
        finalize_all(drafts, options, self.source())
    }
}

fn finalize_all(
    drafts: Vec<TableDraft>,
    options: &TableOptions,
    source: TableSource,
) -> Validated<TableList> {
    let mut defects = Vec::new();
    let mut tables = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match draft.finalize(options) {
            Ok(result) => tables.push(result.drain_into(&mut defects)),
            Err(e) => defects.push(Defect::new(DefectKind::EmptyDetection, e.to_string())),
        }
    }
    Validated::new(TableList::new(tables, source), defects)
}

/// Detectors in fallback priority order.
pub fn default_detectors() -> Vec<Box<dyn TableDetector>> {
    vec![
        Box::new(RasterContourDetector),
        Box::new(LineAlignmentDetector),
        Box::new(RunLengthDetector),
    ]
}
