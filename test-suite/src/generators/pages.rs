//! Synthetic Page Builder
//!
//! Stacks prose, tables and images top to bottom on a letter-sized page and
//! records what a correct reconstruction should find.

use super::rasters::png_bytes;
use pagelift::geometry::Rect;
use pagelift::page::{DetectedCell, PrimaryTable, RawLine};
use pagelift::table::grid::RawMergeSpan;
use pagelift::{ExtractionCandidate, PageInput, PageInputBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 72.0;
const LINE_HEIGHT: f64 = 10.0;
/// Wide enough that prose never reads as a run-length table
const LINE_GAP: f64 = 8.0;
const BLOCK_GAP: f64 = 30.0;
const ROW_PITCH: f64 = 30.0;
const COL_PITCH: f64 = 150.0;

const WORDS: &[&str] = &[
    "layout", "streams", "carry", "glyph", "runs", "without", "structure", "readers", "rebuild",
    "columns", "from", "positions", "and", "gaps", "between", "lines", "of", "text",
];

/// What a generated page should reconstruct to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expected {
    /// `(rows, cols)` of each table, top to bottom
    pub tables: Vec<(usize, usize)>,
    /// Body paragraphs; `None` when table text may leak into paragraphs
    pub paragraphs: Option<usize>,
    pub recovered_images: usize,
    pub images: usize,
    /// Ingest defects the builder provoked
    pub ingest_defects: usize,
}

/// A generated page and its expected reconstruction.
#[derive(Debug, Clone)]
pub struct SyntheticPage {
    pub input: PageInput,
    pub expected: Expected,
}

/// Builder for deterministic synthetic pages.
pub struct SyntheticPageBuilder {
    page: PageInputBuilder,
    rng: StdRng,
    cursor: f64,
    prose_blocks: usize,
    aligned: Vec<(usize, usize)>,
    primary: Vec<(usize, usize)>,
    expected: Expected,
}

impl SyntheticPageBuilder {
    /// Create a builder; the same seed always yields the same page.
    pub fn new(page_number: u32, seed: u64) -> Self {
        Self {
            page: PageInputBuilder::new(page_number, PAGE_WIDTH, PAGE_HEIGHT),
            rng: StdRng::seed_from_u64(seed),
            cursor: MARGIN,
            prose_blocks: 0,
            aligned: Vec::new(),
            primary: Vec::new(),
            expected: Expected::default(),
        }
    }

    /// Remaining vertical room on the page.
    pub fn remaining(&self) -> f64 {
        PAGE_HEIGHT - MARGIN - self.cursor
    }

    /// Add one left-aligned paragraph of `lines` lines.
    pub fn with_paragraph(mut self, lines: usize) -> Self {
        let lines = lines.max(1);
        let top = self.cursor;
        let mut raw = Vec::with_capacity(lines);
        let mut right: f64 = MARGIN;
        for i in 0..lines {
            let y = top + i as f64 * (LINE_HEIGHT + LINE_GAP);
            let text = self.sentence_line(i == 0, i + 1 == lines);
            let x1 = MARGIN + self.rng.gen_range(200.0..460.0);
            right = right.max(x1);
            raw.push(RawLine::new([MARGIN, y, x1, y + LINE_HEIGHT], &text));
        }
        let bottom = top + lines as f64 * (LINE_HEIGHT + LINE_GAP) - LINE_GAP;
        self.page = self.page.raw_block([MARGIN, top, right, bottom], raw, false);
        self.prose_blocks += 1;
        self.advance(bottom);
        self
    }

    /// Add a borderless table whose cells are separate lines sharing
    /// baselines, with a little jitter on every edge, and a one-line
    /// caption below it.
    pub fn with_aligned_table(mut self, rows: usize, cols: usize) -> Self {
        let (rows, cols) = (rows.max(3), cols.max(2));
        let top = self.cursor;
        let mut raw = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let y = top + r as f64 * ROW_PITCH + self.rng.gen_range(-2.0..2.0);
                let x = 50.0 + c as f64 * COL_PITCH + self.rng.gen_range(-3.0..3.0);
                raw.push(RawLine::new([x, y, x + 60.0, y + LINE_HEIGHT], &format!("r{r}c{c}")));
            }
        }
        let bottom = top + (rows - 1) as f64 * ROW_PITCH + LINE_HEIGHT + 2.0;
        let right = 50.0 + (cols - 1) as f64 * COL_PITCH + 63.0;
        self.page = self.page.raw_block([47.0, top - 2.0, right, bottom], raw, false);
        self.aligned.push((rows, cols));
        self.advance(bottom);
        self.with_paragraph(1)
    }

    /// Add a table reported by the reader's own detector, with `merges`
    /// random and possibly malformed merge spans.
    pub fn with_primary_table(mut self, rows: usize, cols: usize, merges: usize) -> Self {
        let (rows, cols) = (rows.max(1), cols.max(1));
        let top = self.cursor;
        let bottom = top + rows as f64 * 20.0;
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| DetectedCell::new(r, c, &format!("p{r}.{c}"))))
            .collect();
        let merges = (0..merges).map(|_| self.raw_span(rows, cols)).collect();
        self.page = self.page.primary_table(PrimaryTable {
            bbox: Rect::new(MARGIN, top, MARGIN + cols as f64 * 80.0, bottom),
            rows,
            cols,
            cells,
            merges,
        });
        self.primary.push((rows, cols));
        self.advance(bottom);
        self
    }

    /// Add an image region; an unrecoverable image only offers bytes no
    /// decoder accepts.
    pub fn with_image(mut self, recoverable: bool) -> Self {
        let top = self.cursor;
        let index = self.expected.images;
        let mut candidates = vec![ExtractionCandidate::new(
            format!("xref_{index}"),
            vec![0x42; self.rng.gen_range(1..64)],
        )];
        if recoverable {
            let (w, h) = (self.rng.gen_range(16..48), self.rng.gen_range(16..48));
            // Generated PNGs this small always encode
            if let Ok(bytes) = png_bytes(w, h) {
                candidates.push(ExtractionCandidate::new("rendered", bytes));
                self.expected.recovered_images += 1;
            }
        }
        self.page = self
            .page
            .raw_raster([MARGIN, top, MARGIN + 100.0, top + 60.0], &format!("img{index}"), candidates);
        self.expected.images += 1;
        self.advance(top + 60.0);
        self
    }

    /// Add a block with no usable geometry at all.
    pub fn with_malformed_block(mut self) -> Self {
        self.page = self.page.raw_block(
            [f64::NAN, 0.0, 10.0, 10.0],
            vec![RawLine::new([f64::INFINITY, 0.0, 1.0, 1.0], "lost")],
            false,
        );
        // Line, block box and the dropped block itself
        self.expected.ingest_defects += 3;
        self
    }

    /// Add a random mix of content until the page fills up.
    pub fn random_content(mut self) -> Self {
        while self.remaining() > 140.0 {
            self = match self.rng.gen_range(0..10) {
                0..=4 => {
                    let lines = self.rng.gen_range(1..6);
                    self.with_paragraph(lines)
                }
                5..=6 => {
                    let (rows, cols) = (self.rng.gen_range(3..5), self.rng.gen_range(2..4));
                    self.with_aligned_table(rows, cols)
                }
                7 => {
                    let (rows, cols) = (self.rng.gen_range(1..5), self.rng.gen_range(1..5));
                    let merges = self.rng.gen_range(0..4);
                    self.with_primary_table(rows, cols, merges)
                }
                8 => {
                    let recoverable = self.rng.gen_bool(0.7);
                    self.with_image(recoverable)
                }
                _ => self.with_malformed_block(),
            };
        }
        self
    }

    pub fn build(self) -> SyntheticPage {
        let mut expected = self.expected;
        if self.primary.is_empty() {
            if self.aligned.len() > 1 {
                // Aligned rows pool into one table spanning whatever lies between them
                let rows = self.aligned.iter().map(|(r, _)| r).sum();
                let cols = self.aligned.iter().map(|(_, c)| *c).max().unwrap_or(0);
                expected.tables = vec![(rows, cols)];
            } else {
                expected.tables = self.aligned;
                expected.paragraphs = Some(self.prose_blocks);
            }
        } else {
            // A usable primary table suppresses every fallback detector
            expected.tables = self.primary;
            expected.paragraphs = self.aligned.is_empty().then_some(self.prose_blocks);
        }
        SyntheticPage {
            input: self.page.build(),
            expected,
        }
    }

    fn advance(&mut self, bottom: f64) {
        self.cursor = bottom + BLOCK_GAP;
    }

    /// Lowercase words; only the first line is capitalized and only the
    /// last one ends a sentence.
    fn sentence_line(&mut self, first: bool, last: bool) -> String {
        let count = self.rng.gen_range(3..8);
        let mut words: Vec<String> = (0..count)
            .map(|_| WORDS[self.rng.gen_range(0..WORDS.len())].to_string())
            .collect();
        if first {
            let mut chars = words[0].chars();
            if let Some(c) = chars.next() {
                words[0] = c.to_uppercase().chain(chars).collect();
            }
        }
        let mut line = words.join(" ");
        if last {
            line.push('.');
        }
        line
    }

    fn raw_span(&mut self, rows: usize, cols: usize) -> RawMergeSpan {
        let mut coord = |limit: usize| match self.rng.gen_range(0..8) {
            0 => f64::NAN,
            1 => -1.0,
            2 => limit as f64 + 2.0,
            _ => self.rng.gen_range(0..limit) as f64,
        };
        let (r0, c0) = (coord(rows), coord(cols));
        let (r1, c1) = (coord(rows), coord(cols));
        RawMergeSpan::new(r0, c0, r1, c1)
    }
}

/// `count` random pages numbered from 1, reproducible from `seed`.
pub fn random_batch(count: usize, seed: u64) -> Vec<SyntheticPage> {
    (0..count)
        .map(|i| SyntheticPageBuilder::new(i as u32 + 1, seed.wrapping_add(i as u64)).random_content().build())
        .collect()
}
