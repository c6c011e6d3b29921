//! Grid inference from positioned text

use super::{Table, TableCell, TableDraft, TableOptions, TableSource};
use crate::error::{Result, Validated};
use crate::geometry::{cluster_positions, Rect};
use crate::page::PrimaryTable;
use crate::table::grid::RawMergeSpan;
use tracing::debug;

// Cell edges closer than this are the same grid line.
const EDGE_SNAP: f64 = 1.0;

/// A piece of text with its position, as fed to the grid builder.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedText {
    pub bbox: Rect,
    pub text: String,
    pub is_bold: bool,
    pub font_size: f64,
}

impl PositionedText {
    pub fn new(bbox: Rect, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
            is_bold: false,
            font_size: 0.0,
        }
    }

    pub fn with_font(mut self, font_size: f64, is_bold: bool) -> Self {
        self.font_size = font_size;
        self.is_bold = is_bold;
        self
    }
}

/// Turns positioned text or detector cells into table drafts.
#[derive(Debug, Clone, Copy)]
pub struct GridBuilder<'a> {
    options: &'a TableOptions,
}

impl<'a> GridBuilder<'a> {
    pub fn new(options: &'a TableOptions) -> Self {
        Self { options }
    }

    /// Infer rows from item tops and columns from item left edges.
    ///
    /// Returns `None` when no item carries text.
    pub fn build(&self, region: Rect, items: &[PositionedText], source: TableSource) -> Option<TableDraft> {
        let items: Vec<&PositionedText> = items.iter().filter(|i| !i.text.trim().is_empty()).collect();
        if items.is_empty() {
            return None;
        }

        let row_centers = cluster_positions(
            &items.iter().map(|i| i.bbox.y0).collect::<Vec<_>>(),
            self.options.row_epsilon,
        );
        let col_centers = cluster_positions(
            &items.iter().map(|i| i.bbox.x0).collect::<Vec<_>>(),
            self.options.column_tolerance,
        );

        let mut placed: Vec<(usize, usize, &PositionedText)> = items
            .iter()
            .map(|item| {
                (
                    nearest(&row_centers, item.bbox.y0),
                    nearest(&col_centers, item.bbox.x0),
                    *item,
                )
            })
            .collect();
        placed.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)).then(a.2.bbox.x0.total_cmp(&b.2.bbox.x0)));

        let mut draft = TableDraft::new(region, row_centers.len(), col_centers.len(), source)
            .with_column_edges(column_edges(region, &col_centers));
        for (row, col, item) in placed {
            draft.push_cell(
                TableCell::new(row, col, &item.text)
                    .with_bbox(item.bbox)
                    .with_font(item.font_size, item.is_bold),
            );
        }

        debug!(
            rows = draft.rows(),
            cols = draft.cols(),
            source = source.method_name(),
            "inferred grid from positioned text"
        );
        Some(draft)
    }

    /// One row per item, a single column.
    pub fn single_column(&self, region: Rect, items: &[PositionedText], source: TableSource) -> Option<TableDraft> {
        if items.is_empty() {
            return None;
        }
        let mut draft = TableDraft::new(region, items.len(), 1, source);
        for (row, item) in items.iter().enumerate() {
            draft.push_cell(
                TableCell::new(row, 0, &item.text)
                    .with_bbox(item.bbox)
                    .with_font(item.font_size, item.is_bold),
            );
        }
        Some(draft)
    }

    /// Adopt a table from the primary detector.
    ///
    /// The detector's grid and text are trusted. Its merge spans are used
    /// when it reported any; otherwise spans are derived from cells whose
    /// boxes cross more than one grid line.
    pub fn from_primary(&self, table: &PrimaryTable) -> Result<Validated<Table>> {
        let edges = CellEdges::from_cells(table);

        let merges = if !table.merges.is_empty() {
            table.merges.clone()
        } else {
            edges
                .as_ref()
                .map(|e| e.derive_merges(table))
                .unwrap_or_default()
        };

        let mut draft = TableDraft::new(table.bbox, table.rows, table.cols, TableSource::Primary)
            .with_merges(merges);
        if let Some(edges) = edges {
            draft = draft.with_column_edges(edges.cols);
        }
        for cell in &table.cells {
            let mut out = TableCell::new(cell.row, cell.col, &cell.text).with_font(cell.font_size, cell.is_bold);
            out.bbox = cell.bbox;
            draft.push_cell(out);
        }
        draft.finalize(self.options)
    }
}

fn nearest(centers: &[f64], value: f64) -> usize {
    centers
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - value).abs().total_cmp(&(b.1 - value).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Region edges plus midpoints between neighbouring column centres.
fn column_edges(region: Rect, centers: &[f64]) -> Vec<f64> {
    let mut edges = Vec::with_capacity(centers.len() + 1);
    edges.push(region.x0);
    edges.extend(centers.windows(2).map(|w| (w[0] + w[1]) / 2.0));
    edges.push(region.x1);
    edges
}

/// Grid lines recovered from detector cell boxes.
struct CellEdges {
    rows: Vec<f64>,
    cols: Vec<f64>,
}

impl CellEdges {
    /// `None` unless the boxes produce exactly the detector's grid.
    fn from_cells(table: &PrimaryTable) -> Option<Self> {
        let boxes: Vec<Rect> = table.cells.iter().filter_map(|c| c.bbox).collect();
        if boxes.is_empty() {
            return None;
        }
        let rows = cluster_positions(
            &boxes.iter().flat_map(|b| [b.y0, b.y1]).collect::<Vec<_>>(),
            EDGE_SNAP,
        );
        let cols = cluster_positions(
            &boxes.iter().flat_map(|b| [b.x0, b.x1]).collect::<Vec<_>>(),
            EDGE_SNAP,
        );
        if rows.len().checked_sub(1) != Some(table.rows) || cols.len().checked_sub(1) != Some(table.cols) {
            return None;
        }
        Some(Self { rows, cols })
    }

    fn derive_merges(&self, table: &PrimaryTable) -> Vec<RawMergeSpan> {
        table
            .cells
            .iter()
            .filter_map(|cell| cell.bbox)
            .filter_map(|bbox| {
                let row_start = nearest(&self.rows, bbox.y0);
                let row_end = nearest(&self.rows, bbox.y1).checked_sub(1)?;
                let col_start = nearest(&self.cols, bbox.x0);
                let col_end = nearest(&self.cols, bbox.x1).checked_sub(1)?;
                (row_end > row_start || col_end > col_start).then(|| {
                    RawMergeSpan::new(
                        row_start as f64,
                        col_start as f64,
                        row_end as f64,
                        col_end as f64,
                    )
                })
            })
            .collect()
    }
}
