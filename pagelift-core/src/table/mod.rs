//! Table reconstruction
//!
//! Tables reach the rest of the engine only as finalized [`Table`] values.
//! Every producer (the primary detector adapter and each fallback strategy)
//! assembles a [`TableDraft`] and calls [`TableDraft::finalize`], which runs
//! the merged-cell validator once and freezes the result.
//!
//! # Example
//!
//! ```rust
//! use pagelift::geometry::Rect;
//! use pagelift::table::{TableCell, TableDraft, TableOptions, TableSource};
//! use pagelift::table::grid::RawMergeSpan;
//!
//! # fn main() -> pagelift::Result<()> {
//! let draft = TableDraft::new(Rect::new(0.0, 0.0, 300.0, 60.0), 2, 3, TableSource::Primary)
//!     .with_cell(TableCell::new(0, 0, "Name"))
//!     .with_cell(TableCell::new(1, 0, "Alice"))
//!     .with_merges(vec![RawMergeSpan::new(0.0, 1.0, 0.0, 7.0)]);
//!
//! let table = draft.finalize(&TableOptions::default())?.value;
//! assert_eq!(table.merges().as_slice()[0].col_end, 2);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cleanup;
pub mod detect;
pub mod grid;
pub mod region_text;
pub mod resolver;

pub use builder::{GridBuilder, PositionedText};
pub use detect::{LineAlignmentDetector, RasterContourDetector, RunLengthDetector, TableDetector};
pub use grid::{CellGridValidator, FinalizedSpans, GridDimensions, MergeSpan, RawMergeSpan};
pub use region_text::RegionTextSource;
pub use resolver::TableStructureResolver;

use crate::candidate::{CandidatePayload, CandidateValidator};
use crate::error::{Defect, DefectKind, LayoutError, Result, Validated};
use crate::geometry::Rect;
use tracing::trace;

const HEADER_KEYWORDS: &[&str] = &[
    "total", "sum", "合计", "小计", "总计", "标题", "序号", "编号", "日期", "时间", "姓名", "名称",
    "金额", "价格", "数量",
];

/// Options for table reconstruction
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableOptions {
    /// Vertical distance within which items share a row
    pub row_epsilon: f64,
    /// Horizontal distance within which item edges share a column
    pub column_tolerance: f64,
    /// Page lines required before line alignment is attempted
    pub min_page_lines: usize,
    /// Multi-item rows needed to call a region a table
    pub min_row_groups: usize,
    /// Split aligned rows into runs at every single-item row
    pub contiguous_row_runs: bool,
    /// Block lines required before run-length detection is attempted
    pub min_run_lines: usize,
    /// Largest allowed spread between inter-line gaps in a run
    pub gap_variance_limit: f64,
    /// Average gap must stay below this share of the average line height
    pub gap_to_height_ratio: f64,
    /// Dark pixels are those below this luminance
    pub binarize_threshold: u8,
    /// Minimum contour bounding-box area in raster pixels
    pub min_contour_area: u32,
    /// Row 0 font size above which it is treated as a header
    pub header_font_size: f64,
    /// Maximum text length for keyword-based header detection
    pub header_keyword_max_len: usize,
    pub detect_header_rows: bool,
    /// Largest grid, in cells, a table may claim
    pub max_cells: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            row_epsilon: 5.0,
            column_tolerance: 10.0,
            min_page_lines: 6,
            min_row_groups: 3,
            contiguous_row_runs: false,
            min_run_lines: 4,
            gap_variance_limit: 5.0,
            gap_to_height_ratio: 0.5,
            binarize_threshold: 200,
            min_contour_area: 1000,
            header_font_size: 12.0,
            header_keyword_max_len: 20,
            detect_header_rows: true,
            max_cells: 100_000,
        }
    }
}

impl TableOptions {
    pub fn with_row_epsilon(mut self, epsilon: f64) -> Self {
        self.row_epsilon = epsilon;
        self
    }

    pub fn with_column_tolerance(mut self, tolerance: f64) -> Self {
        self.column_tolerance = tolerance;
        self
    }

    pub fn with_min_row_groups(mut self, groups: usize) -> Self {
        self.min_row_groups = groups;
        self
    }

    pub fn with_contiguous_row_runs(mut self, contiguous: bool) -> Self {
        self.contiguous_row_runs = contiguous;
        self
    }

    pub fn with_min_contour_area(mut self, area: u32) -> Self {
        self.min_contour_area = area;
        self
    }

    pub fn with_header_detection(mut self, enabled: bool) -> Self {
        self.detect_header_rows = enabled;
        self
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }
}

/// Which producer built a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableSource {
    Primary,
    RasterContour,
    LineAlignment,
    RunLength,
}

impl TableSource {
    /// Strategy name as used for candidate methods.
    pub fn method_name(&self) -> &'static str {
        match self {
            TableSource::Primary => "primary",
            TableSource::RasterContour => "raster_contour",
            TableSource::LineAlignment => "line_alignment",
            TableSource::RunLength => "run_length",
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableCell {
    pub row: usize,
    pub col: usize,
    pub bbox: Option<Rect>,
    pub text: String,
    pub is_bold: bool,
    pub font_size: f64,
}

impl TableCell {
    pub fn new(row: usize, col: usize, text: &str) -> Self {
        Self {
            row,
            col,
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_font(mut self, font_size: f64, is_bold: bool) -> Self {
        self.font_size = font_size;
        self.is_bold = is_bold;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A table under construction.
#[derive(Debug, Clone)]
pub struct TableDraft {
    bbox: Rect,
    rows: usize,
    cols: usize,
    source: TableSource,
    cells: Vec<TableCell>,
    merges: Vec<RawMergeSpan>,
    column_edges: Vec<f64>,
}

impl TableDraft {
    pub fn new(bbox: Rect, rows: usize, cols: usize, source: TableSource) -> Self {
        Self {
            bbox,
            rows,
            cols,
            source,
            cells: Vec::new(),
            merges: Vec::new(),
            column_edges: Vec::new(),
        }
    }

    pub fn with_cell(mut self, cell: TableCell) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn push_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    pub fn with_merges(mut self, merges: Vec<RawMergeSpan>) -> Self {
        self.merges = merges;
        self
    }

    /// Column boundaries, `cols + 1` ascending x positions.
    pub fn with_column_edges(mut self, edges: Vec<f64>) -> Self {
        self.column_edges = edges;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Validate merges and freeze the table.
    ///
    /// Fails for a zero-sized grid or one larger than `options.max_cells`.
    pub fn finalize(self, options: &TableOptions) -> Result<Validated<Table>> {
        let validator = CellGridValidator::new(self.rows, self.cols)?;
        let cell_count = self
            .rows
            .checked_mul(self.cols)
            .filter(|&n| n <= options.max_cells)
            .ok_or(LayoutError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: options.max_cells,
            })?;
        let Validated {
            value: merges,
            mut defects,
        } = validator.validate(&self.merges);

        let mut grid: Vec<TableCell> = (0..cell_count)
            .map(|i| TableCell {
                row: i / self.cols,
                col: i % self.cols,
                ..Default::default()
            })
            .collect();

        for cell in self.cells {
            if cell.row >= self.rows || cell.col >= self.cols {
                defects.push(Defect::new(
                    DefectKind::InvalidCell,
                    format!(
                        "cell ({}, {}) outside {}x{} table",
                        cell.row, cell.col, self.rows, self.cols
                    ),
                ));
                continue;
            }
            let slot = &mut grid[cell.row * self.cols + cell.col];
            let text = cleanup::clean_cell_text(&cell.text);
            if slot.text.is_empty() {
                slot.text = text;
            } else if !text.is_empty() {
                slot.text.push(' ');
                slot.text.push_str(&text);
            }
            slot.bbox = match (slot.bbox, cell.bbox) {
                (Some(a), Some(b)) => Some(crate::geometry::union(&a, &b)),
                (a, b) => a.or(b),
            };
            slot.is_bold |= cell.is_bold;
            slot.font_size = slot.font_size.max(cell.font_size);
        }

        for span in merges.iter() {
            let mut moved = Vec::new();
            for (row, col) in span.cells().skip(1) {
                let covered = &mut grid[row * self.cols + col];
                if !covered.text.is_empty() {
                    moved.push(std::mem::take(&mut covered.text));
                }
            }
            if !moved.is_empty() {
                trace!(%span, count = moved.len(), "moving covered text into anchor");
                let anchor = &mut grid[span.row_start * self.cols + span.col_start];
                for text in moved {
                    if !anchor.text.is_empty() {
                        anchor.text.push('\n');
                    }
                    anchor.text.push_str(&text);
                }
                anchor.text = cleanup::truncate_cell_text(&anchor.text);
            }
        }

        let column_widths = if self.column_edges.len().checked_sub(1) == Some(self.cols) {
            self.column_edges.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect()
        } else {
            vec![self.bbox.width() / self.cols as f64; self.cols]
        };

        let header_rows = if options.detect_header_rows && is_header_row(&grid[..self.cols], options) {
            1
        } else {
            0
        };

        let table = Table {
            bbox: self.bbox,
            rows: self.rows,
            cols: self.cols,
            source: self.source,
            cells: grid,
            merges,
            header_rows,
            column_widths,
        };
        Ok(Validated::new(table, defects))
    }
}

fn is_header_row(cells: &[TableCell], options: &TableOptions) -> bool {
    cells.iter().any(|cell| {
        if cell.is_bold || cell.font_size > options.header_font_size {
            return true;
        }
        let text = cell.text.trim();
        !text.is_empty()
            && text.chars().count() < options.header_keyword_max_len
            && {
                let lower = text.to_lowercase();
                HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
            }
    })
}

/// A finalized, immutable table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Table {
    bbox: Rect,
    rows: usize,
    cols: usize,
    source: TableSource,
    cells: Vec<TableCell>,
    merges: FinalizedSpans,
    header_rows: usize,
    column_widths: Vec<f64>,
}

impl Table {
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row.checked_mul(self.cols)?.checked_add(col)?)
        } else {
            None
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    pub fn row(&self, row: usize) -> Option<&[TableCell]> {
        if row >= self.rows {
            return None;
        }
        let start = row.checked_mul(self.cols)?;
        self.cells.get(start..start.checked_add(self.cols)?)
    }

    pub fn merges(&self) -> &FinalizedSpans {
        &self.merges
    }

    /// Number of leading header rows (0 or 1).
    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    /// Cell texts as a dense grid.
    pub fn text_grid(&self) -> Vec<Vec<String>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.text.clone()).collect())
            .collect()
    }
}

/// Tables found on a page and the producer that found them.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableList {
    pub tables: Vec<Table>,
    pub source: Option<TableSource>,
}

impl TableList {
    pub fn new(tables: Vec<Table>, source: TableSource) -> Self {
        Self {
            tables,
            source: Some(source),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn regions(&self) -> Vec<Rect> {
        self.tables.iter().map(Table::bbox).collect()
    }
}

impl CandidatePayload for TableList {
    fn byte_size(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| t.cells())
            .map(|c| c.text.len())
            .sum()
    }
}

/// Accepts a strategy's output when it contains at least one table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableListValidator;

impl CandidateValidator<TableList> for TableListValidator {
    fn validate(&self, payload: &TableList) -> std::result::Result<(), String> {
        if payload.is_empty() {
            return Err("no tables".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn region() -> Rect {
        Rect::new(0.0, 0.0, 300.0, 90.0)
    }

    #[test]
    fn test_finalize_zero_grid_fails() {
        let draft = TableDraft::new(region(), 0, 2, TableSource::Primary);
        assert!(draft.finalize(&TableOptions::default()).is_err());
    }

    #[test]
    fn test_finalize_rejects_oversized_grid() {
        let overflowing = TableDraft::new(region(), usize::MAX / 2, 3, TableSource::Primary);
        assert!(matches!(
            overflowing.finalize(&TableOptions::default()),
            Err(LayoutError::GridTooLarge { cols: 3, .. })
        ));

        let options = TableOptions::default().with_max_cells(6);
        assert!(TableDraft::new(region(), 2, 3, TableSource::Primary).finalize(&options).is_ok());
        assert!(TableDraft::new(region(), 3, 3, TableSource::Primary).finalize(&options).is_err());
    }

    #[test]
    fn test_row_and_cell_access() {
        let table = TableDraft::new(region(), 2, 2, TableSource::Primary)
            .with_cell(TableCell::new(1, 0, "c"))
            .finalize(&TableOptions::default())
            .unwrap()
            .value;

        assert_eq!(table.row(1).unwrap()[0].text, "c");
        assert!(table.row(2).is_none());
        assert!(table.cell(0, 2).is_none());
        assert!(table.cell(usize::MAX, 0).is_none());
    }

    #[test]
    fn test_finalize_places_cells_and_reports_strays() {
        let result = TableDraft::new(region(), 2, 2, TableSource::Primary)
            .with_cell(TableCell::new(0, 0, "a"))
            .with_cell(TableCell::new(1, 1, "d"))
            .with_cell(TableCell::new(4, 0, "stray"))
            .finalize(&TableOptions::default())
            .unwrap();

        let table = result.value;
        assert_eq!(
            table.text_grid(),
            vec![vec!["a".to_string(), String::new()], vec![String::new(), "d".to_string()]]
        );
        assert_eq!(result.defects.len(), 1);
        assert_eq!(result.defects[0].kind, DefectKind::InvalidCell);
    }

    #[test]
    fn test_covered_text_moves_to_anchor() {
        let table = TableDraft::new(region(), 2, 2, TableSource::Primary)
            .with_cell(TableCell::new(0, 0, "top"))
            .with_cell(TableCell::new(0, 1, "right"))
            .with_cell(TableCell::new(1, 0, "below"))
            .with_merges(vec![RawMergeSpan::new(0.0, 0.0, 1.0, 1.0)])
            .finalize(&TableOptions::default())
            .unwrap()
            .value;

        assert_eq!(table.cell(0, 0).unwrap().text, "top\nright\nbelow");
        assert!(table.cell(0, 1).unwrap().is_empty());
        assert!(table.cell(1, 0).unwrap().is_empty());
        assert_eq!(table.merges().len(), 1);
    }

    #[test]
    fn test_header_row_detection() {
        let options = TableOptions::default();
        let bold = TableDraft::new(region(), 2, 1, TableSource::Primary)
            .with_cell(TableCell::new(0, 0, "Header").with_font(10.0, true))
            .finalize(&options)
            .unwrap()
            .value;
        assert_eq!(bold.header_rows(), 1);

        let keyword = TableDraft::new(region(), 2, 1, TableSource::Primary)
            .with_cell(TableCell::new(0, 0, "Total"))
            .finalize(&options)
            .unwrap()
            .value;
        assert_eq!(keyword.header_rows(), 1);

        let plain = TableDraft::new(region(), 2, 1, TableSource::Primary)
            .with_cell(TableCell::new(0, 0, "apples"))
            .finalize(&options)
            .unwrap()
            .value;
        assert_eq!(plain.header_rows(), 0);

        let disabled = TableDraft::new(region(), 2, 1, TableSource::Primary)
            .with_cell(TableCell::new(0, 0, "Total"))
            .finalize(&options.clone().with_header_detection(false))
            .unwrap()
            .value;
        assert_eq!(disabled.header_rows(), 0);
    }

    #[test]
    fn test_column_widths() {
        let even = TableDraft::new(region(), 1, 3, TableSource::LineAlignment)
            .finalize(&TableOptions::default())
            .unwrap()
            .value;
        assert_eq!(even.column_widths(), &[100.0, 100.0, 100.0]);

        let edged = TableDraft::new(region(), 1, 2, TableSource::LineAlignment)
            .with_column_edges(vec![0.0, 120.0, 300.0])
            .finalize(&TableOptions::default())
            .unwrap()
            .value;
        assert_eq!(edged.column_widths(), &[120.0, 180.0]);
    }

    #[test]
    fn test_table_list_validator() {
        assert!(TableListValidator.validate(&TableList::empty()).is_err());
    }
}
