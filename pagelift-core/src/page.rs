//! Page input model
//!
//! A [`PageInput`] is everything the external reader knows about one page:
//! text blocks with their lines, raster regions with their extraction
//! candidates, tables reported by its own detector and optionally a
//! grayscale rendering of the page. Nothing here is interpreted yet.
//!
//! Readers with untrusted geometry should go through [`PageInputBuilder`],
//! which drops malformed boxes and records each drop as a defect instead of
//! failing the page.

use crate::candidate::ExtractionCandidate;
use crate::error::{Defect, DefectKind};
use crate::geometry::{union_all, Rect};
use crate::table::grid::RawMergeSpan;
use crate::text::normalize::{is_blank, normalize_text};
use image::GrayImage;

/// One positioned run inside a line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextSpan {
    pub bbox: Rect,
    pub text: String,
    pub font_size: f64,
    pub is_bold: bool,
}

impl TextSpan {
    pub fn new(bbox: Rect, text: &str, font_size: f64, is_bold: bool) -> Self {
        Self {
            bbox,
            text: normalize_text(text),
            font_size,
            is_bold,
        }
    }
}

/// A visual line of text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextLine {
    pub bbox: Rect,
    /// NFC-normalized; explicit breaks are `\n`
    pub text: String,
    pub font_size: f64,
    pub is_bold: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn new(bbox: Rect, text: &str) -> Self {
        Self {
            bbox,
            text: normalize_text(text),
            font_size: 12.0,
            is_bold: false,
            spans: Vec::new(),
        }
    }

    pub fn with_font(mut self, font_size: f64, is_bold: bool) -> Self {
        self.font_size = font_size;
        self.is_bold = is_bold;
        self
    }

    pub fn with_spans(mut self, spans: Vec<TextSpan>) -> Self {
        self.spans = spans;
        self
    }

    pub fn is_blank(&self) -> bool {
        is_blank(&self.text)
    }

    /// Largest font size over the line and its spans.
    pub fn max_font_size(&self) -> f64 {
        self.spans
            .iter()
            .map(|s| s.font_size)
            .fold(self.font_size, f64::max)
    }

    /// Text assembled from spans, `None` when the line carries none.
    pub fn span_text(&self) -> Option<String> {
        if self.spans.is_empty() {
            return None;
        }
        Some(self.spans.iter().map(|s| s.text.as_str()).collect())
    }
}

/// A block of lines as grouped by the reader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentBlock {
    pub bbox: Rect,
    pub lines: Vec<TextLine>,
    /// Set when the reader's own structure marks the block as a heading
    #[cfg_attr(feature = "serde", serde(default))]
    pub tagged_heading: bool,
}

impl ContentBlock {
    /// Block whose box is the union of its lines.
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let bbox = union_all(lines.iter().map(|l| &l.bbox)).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        Self {
            bbox,
            lines,
            tagged_heading: false,
        }
    }

    pub fn with_heading_tag(mut self, tagged: bool) -> Self {
        self.tagged_heading = tagged;
        self
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A raster region and the candidates recovered for it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterBlock {
    pub bbox: Rect,
    pub resource_id: String,
    pub candidates: Vec<ExtractionCandidate<Vec<u8>>>,
}

/// A cell as reported by the primary table detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectedCell {
    pub row: usize,
    pub col: usize,
    pub bbox: Option<Rect>,
    pub text: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_bold: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub font_size: f64,
}

impl DetectedCell {
    pub fn new(row: usize, col: usize, text: &str) -> Self {
        Self {
            row,
            col,
            bbox: None,
            text: text.to_string(),
            is_bold: false,
            font_size: 0.0,
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
}

/// A table found by the reader's own detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimaryTable {
    pub bbox: Rect,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<DetectedCell>,
    /// Merge spans as reported; may be empty, overlapping or out of range
    #[cfg_attr(feature = "serde", serde(default))]
    pub merges: Vec<RawMergeSpan>,
}

/// Grayscale rendering of the page at `scale` pixels per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRaster {
    pub image: GrayImage,
    pub scale: f64,
}

impl PageRaster {
    pub fn new(image: GrayImage, scale: f64) -> Self {
        Self { image, scale }
    }
}

/// Raw geometric content of one page.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageInput {
    pub page_number: u32,
    pub width: f64,
    pub height: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocks: Vec<ContentBlock>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rasters: Vec<RasterBlock>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub primary_tables: Vec<PrimaryTable>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raster: Option<PageRaster>,
    /// Problems found while ingesting raw geometry
    #[cfg_attr(feature = "serde", serde(default))]
    pub ingest_defects: Vec<Defect>,
}

impl PageInput {
    pub fn new(page_number: u32, width: f64, height: f64) -> Self {
        Self {
            page_number,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// All lines of all blocks in reading order of the blocks.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }
}

/// A line as delivered by a reader, before geometry checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub bbox: [f64; 4],
    pub text: String,
    pub font_size: f64,
    pub is_bold: bool,
}

impl RawLine {
    pub fn new(bbox: [f64; 4], text: &str) -> Self {
        Self {
            bbox,
            text: text.to_string(),
            font_size: 12.0,
            is_bold: false,
        }
    }

    pub fn with_font(mut self, font_size: f64, is_bold: bool) -> Self {
        self.font_size = font_size;
        self.is_bold = is_bold;
        self
    }
}

/// Builds a [`PageInput`] from unchecked reader output.
#[derive(Debug)]
pub struct PageInputBuilder {
    page: PageInput,
}

impl PageInputBuilder {
    pub fn new(page_number: u32, width: f64, height: f64) -> Self {
        Self {
            page: PageInput::new(page_number, width, height),
        }
    }

    /// Add a block from raw line boxes.
    ///
    /// Lines with malformed boxes are dropped. The block box is checked
    /// too; when it is unusable the union of the surviving lines is used,
    /// and the block is dropped if no line survived either.
    pub fn raw_block(mut self, bbox: [f64; 4], lines: Vec<RawLine>, tagged_heading: bool) -> Self {
        let mut kept = Vec::with_capacity(lines.len());
        for raw in lines {
            match Rect::try_from(raw.bbox) {
                Ok(rect) => kept.push(TextLine::new(rect, &raw.text).with_font(raw.font_size, raw.is_bold)),
                Err(e) => self.defect(DefectKind::MalformedGeometry, format!("line {:?}: {e}", raw.text)),
            }
        }

        let block_box = match Rect::try_from(bbox) {
            Ok(rect) => Some(rect),
            Err(e) => {
                self.defect(DefectKind::MalformedGeometry, format!("block: {e}"));
                union_all(kept.iter().map(|l| &l.bbox))
            }
        };

        match block_box {
            Some(bbox) => {
                self.page.blocks.push(ContentBlock {
                    bbox,
                    lines: kept,
                    tagged_heading,
                });
            }
            None => self.defect(DefectKind::MalformedGeometry, "block dropped: no usable geometry"),
        }
        self
    }

    pub fn block(mut self, block: ContentBlock) -> Self {
        self.page.blocks.push(block);
        self
    }

    /// Add a raster region; a malformed box drops the region.
    pub fn raw_raster(
        mut self,
        bbox: [f64; 4],
        resource_id: &str,
        candidates: Vec<ExtractionCandidate<Vec<u8>>>,
    ) -> Self {
        match Rect::try_from(bbox) {
            Ok(bbox) => self.page.rasters.push(RasterBlock {
                bbox,
                resource_id: resource_id.to_string(),
                candidates,
            }),
            Err(e) => self.defect(DefectKind::MalformedGeometry, format!("raster {resource_id}: {e}")),
        }
        self
    }

    pub fn primary_table(mut self, table: PrimaryTable) -> Self {
        self.page.primary_tables.push(table);
        self
    }

    pub fn raster(mut self, raster: PageRaster) -> Self {
        self.page.raster = Some(raster);
        self
    }

    pub fn build(self) -> PageInput {
        self.page
    }

    fn defect(&mut self, kind: DefectKind, detail: impl Into<String>) {
        self.page.ingest_defects.push(Defect::new(kind, detail));
    }
}
