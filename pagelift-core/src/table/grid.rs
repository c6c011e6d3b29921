//! Merged-cell rectangularization
//!
//! Upstream detectors report merge regions that may overlap each other,
//! run past the grid, or not even be integers. [`CellGridValidator`] turns
//! any such set into a [`FinalizedSpans`] value whose spans are pairwise
//! disjoint and lie inside the grid. `FinalizedSpans` has no public
//! constructor, so a span set that reached a [`Table`](super::Table) has
//! necessarily been through here.
//!
//! Validation steps:
//!
//! 1. convert raw coordinates, dropping spans that are not non-negative
//!    integers or that are inverted
//! 2. sort by `(row_start, col_start)`
//! 3. replace every group of overlapping spans by their bounding union,
//!    repeating until no two spans share a cell
//! 4. clip ends to the last row and column, dropping spans whose start lies
//!    outside the grid
//!
//! The result is sorted by `(row_start, col_start)`, and validating it
//! again returns it unchanged.

use crate::error::{Defect, DefectKind, LayoutError, Result, Validated};
use tracing::{debug, trace};

// Largest f64 that still maps one-to-one onto an integer.
const MAX_EXACT_INDEX: f64 = 9_007_199_254_740_992.0;

/// A rectangular region of grid cells, all bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeSpan {
    pub row_start: usize,
    pub col_start: usize,
    pub row_end: usize,
    pub col_end: usize,
}

impl MergeSpan {
    pub fn new(row_start: usize, col_start: usize, row_end: usize, col_end: usize) -> Self {
        Self {
            row_start,
            col_start,
            row_end,
            col_end,
        }
    }

    /// Whether the two spans share at least one cell.
    pub fn overlaps(&self, other: &MergeSpan) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &MergeSpan) -> MergeSpan {
        MergeSpan {
            row_start: self.row_start.min(other.row_start),
            col_start: self.col_start.min(other.col_start),
            row_end: self.row_end.max(other.row_end),
            col_end: self.col_end.max(other.col_end),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..=self.row_end).contains(&row) && (self.col_start..=self.col_end).contains(&col)
    }

    pub fn row_span(&self) -> usize {
        self.row_end - self.row_start + 1
    }

    pub fn col_span(&self) -> usize {
        self.col_end - self.col_start + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_start == self.row_end && self.col_start == self.col_end
    }

    /// Top-left cell, which keeps the merged content.
    pub fn anchor(&self) -> (usize, usize) {
        (self.row_start, self.col_start)
    }

    /// All covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row_start..=self.row_end)
            .flat_map(move |r| (self.col_start..=self.col_end).map(move |c| (r, c)))
    }

    fn sort_key(&self) -> (usize, usize) {
        (self.row_start, self.col_start)
    }
}

impl std::fmt::Display for MergeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.row_start, self.col_start, self.row_end, self.col_end
        )
    }
}

/// A merge span exactly as a detector reported it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMergeSpan {
    pub row_start: f64,
    pub col_start: f64,
    pub row_end: f64,
    pub col_end: f64,
}

impl RawMergeSpan {
    pub fn new(row_start: f64, col_start: f64, row_end: f64, col_end: f64) -> Self {
        Self {
            row_start,
            col_start,
            row_end,
            col_end,
        }
    }

    /// Convert to integer coordinates.
    pub fn to_span(&self) -> std::result::Result<MergeSpan, String> {
        let span = MergeSpan {
            row_start: to_index(self.row_start)?,
            col_start: to_index(self.col_start)?,
            row_end: to_index(self.row_end)?,
            col_end: to_index(self.col_end)?,
        };
        if span.row_start > span.row_end || span.col_start > span.col_end {
            return Err(format!("inverted span {span}"));
        }
        Ok(span)
    }
}

impl From<MergeSpan> for RawMergeSpan {
    fn from(span: MergeSpan) -> Self {
        RawMergeSpan {
            row_start: span.row_start as f64,
            col_start: span.col_start as f64,
            row_end: span.row_end as f64,
            col_end: span.col_end as f64,
        }
    }
}

fn to_index(value: f64) -> std::result::Result<usize, String> {
    if !value.is_finite() {
        return Err(format!("non-finite coordinate {value}"));
    }
    if value < 0.0 {
        return Err(format!("negative coordinate {value}"));
    }
    if value.fract() != 0.0 {
        return Err(format!("fractional coordinate {value}"));
    }
    if value > MAX_EXACT_INDEX {
        return Err(format!("coordinate {value} out of range"));
    }
    usize::try_from(value as u64).map_err(|_| format!("coordinate {value} out of range"))
}

/// Grid size; both sides are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    rows: usize,
    cols: usize,
}

impl GridDimensions {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::InvalidGridDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }
}

/// A merge span set that passed [`CellGridValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FinalizedSpans {
    spans: Vec<MergeSpan>,
}

impl FinalizedSpans {
    pub fn as_slice(&self) -> &[MergeSpan] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MergeSpan> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The span covering `(row, col)`, if any.
    pub fn span_at(&self, row: usize, col: usize) -> Option<&MergeSpan> {
        self.spans.iter().find(|s| s.contains(row, col))
    }

    /// Whether `(row, col)` is covered by a span without being its anchor.
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.span_at(row, col)
            .is_some_and(|s| s.anchor() != (row, col))
    }
}

impl<'a> IntoIterator for &'a FinalizedSpans {
    type Item = &'a MergeSpan;
    type IntoIter = std::slice::Iter<'a, MergeSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

/// Makes a merge region set safe to write.
#[derive(Debug, Clone, Copy)]
pub struct CellGridValidator {
    dims: GridDimensions,
}

impl CellGridValidator {
    /// Fails only when `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            dims: GridDimensions::new(rows, cols)?,
        })
    }

    pub fn with_dimensions(dims: GridDimensions) -> Self {
        Self { dims }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Validate spans as reported by a detector.
    pub fn validate(&self, raw: &[RawMergeSpan]) -> Validated<FinalizedSpans> {
        let mut defects = Vec::new();
        let mut spans = Vec::with_capacity(raw.len());
        for candidate in raw {
            match candidate.to_span() {
                Ok(span) => spans.push(span),
                Err(reason) => {
                    trace!(?candidate, %reason, "dropping malformed span");
                    defects.push(Defect::new(DefectKind::MalformedSpan, reason));
                }
            }
        }

        let mut result = self.finalize(spans);
        defects.append(&mut result.defects);
        Validated::new(result.value, defects)
    }

    /// Validate spans that already carry integer coordinates.
    pub fn validate_spans(&self, spans: &[MergeSpan]) -> Validated<FinalizedSpans> {
        let mut defects = Vec::new();
        let mut kept = Vec::with_capacity(spans.len());
        for span in spans {
            if span.row_start > span.row_end || span.col_start > span.col_end {
                defects.push(Defect::new(
                    DefectKind::MalformedSpan,
                    format!("inverted span {span}"),
                ));
            } else {
                kept.push(*span);
            }
        }

        let mut result = self.finalize(kept);
        defects.append(&mut result.defects);
        Validated::new(result.value, defects)
    }

    /// Run an already finalized set through validation again.
    ///
    /// For spans produced with the same dimensions this is the identity.
    pub fn revalidate(&self, spans: &FinalizedSpans) -> Validated<FinalizedSpans> {
        self.validate_spans(spans.as_slice())
    }

    fn finalize(&self, mut spans: Vec<MergeSpan>) -> Validated<FinalizedSpans> {
        spans.sort_by_key(MergeSpan::sort_key);

        let merged = merge_overlapping(spans);
        let mut defects = Vec::new();
        let mut clipped = Vec::with_capacity(merged.len());

        for span in merged {
            if !self.dims.contains(span.row_start, span.col_start) {
                debug!(%span, rows = self.dims.rows, cols = self.dims.cols, "span starts outside grid");
                defects.push(Defect::new(
                    DefectKind::SpanOutOfBounds,
                    format!("{span} on {}x{}", self.dims.rows, self.dims.cols),
                ));
                continue;
            }
            clipped.push(MergeSpan {
                row_end: span.row_end.min(self.dims.rows - 1),
                col_end: span.col_end.min(self.dims.cols - 1),
                ..span
            });
        }

        clipped.sort_by_key(MergeSpan::sort_key);
        Validated::new(FinalizedSpans { spans: clipped }, defects)
    }
}

/// Fold overlapping spans into their unions until the set is disjoint.
fn merge_overlapping(spans: Vec<MergeSpan>) -> Vec<MergeSpan> {
    let mut accepted: Vec<MergeSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        let mut current = span;
        while let Some(pos) = accepted.iter().position(|a| a.overlaps(&current)) {
            let other = accepted.swap_remove(pos);
            trace!(%current, %other, "merging overlapping spans");
            current = current.union(&other);
        }
        accepted.push(current);
    }
    accepted
}
