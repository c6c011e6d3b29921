//! # pagelift
//!
//! Layout reconstruction for extracted document pages. Given the positioned
//! text, raster regions and reader-detected tables of a page, pagelift
//! rebuilds the logical structure: paragraphs, tables with validated merged
//! cells, and one chosen payload per image.
//!
//! ## Features
//!
//! - **Merge-span validation**: overlapping spans are coalesced, spans are
//!   clipped to the grid, and every table leaves with a consistent span set
//! - **Table fallbacks**: raster contours, line alignment and run-length
//!   detection, tried in order when the reader found no table
//! - **Paragraph segmentation**: indentation, vertical gaps, sentence
//!   endings and list markers split blocks into paragraphs
//! - **Candidate selection**: trusted extraction methods first, then the
//!   best-scoring candidate that passes validation
//! - **Defects, not failures**: malformed input is recorded on the output
//!   and processing continues
//!
//! ## Quick Start
//!
//! ```rust
//! use pagelift::page::{PageInputBuilder, RawLine};
//! use pagelift::{LayoutOptions, PagePipeline};
//!
//! let page = PageInputBuilder::new(1, 612.0, 792.0)
//!     .raw_block(
//!         [72.0, 100.0, 540.0, 126.0],
//!         vec![
//!             RawLine::new([72.0, 100.0, 540.0, 112.0], "Layout reconstruction keeps"),
//!             RawLine::new([72.0, 114.0, 300.0, 126.0], "lines of one paragraph together."),
//!         ],
//!         false,
//!     )
//!     .build();
//!
//! let pipeline = PagePipeline::standard(&LayoutOptions::default());
//! let output = pipeline.process(&page);
//! assert_eq!(output.paragraphs.len(), 1);
//! assert_eq!(
//!     output.paragraphs[0].text(),
//!     "Layout reconstruction keeps\nlines of one paragraph together."
//! );
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Boxes, overlap and position clustering
//! - [`table`] - Merge-span validation and table resolution
//! - [`text`] - Paragraph segmentation, alignment and list markers
//! - [`candidate`] - Ranking and validation of alternative extractions
//! - [`pipeline`] - Per-page stages and their output
//! - [`batch`] - Page-parallel processing

pub mod batch;
pub mod candidate;
pub mod error;
pub mod geometry;
pub mod options;
pub mod page;
pub mod pipeline;
pub mod raster;
pub mod table;
pub mod text;

pub use batch::{BatchOptions, BatchProcessor, BatchSummary};
pub use candidate::{
    first_valid, CandidateSelector, CandidateValidator, ExtractionCandidate, SelectionPolicy, TrustRule,
};
pub use error::{Defect, DefectKind, LayoutError, Resolved, Result, Validated};
pub use geometry::{Point, Rect};
pub use options::{ImageSelectionOptions, LayoutOptions};
pub use page::{ContentBlock, PageInput, PageInputBuilder, TextLine, TextSpan};
pub use pipeline::{PageOutput, PagePipeline, PageStage};
pub use table::{CellGridValidator, MergeSpan, Table, TableList, TableOptions, TableStructureResolver};
pub use text::{Paragraph, ParagraphSegmenter, SegmenterOptions};

/// Current version of pagelift
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reconstruct one page with the standard pipeline.
///
/// Invalid options are rejected before any page work starts.
pub fn reconstruct_page(page: &PageInput, options: &LayoutOptions) -> Result<PageOutput> {
    options.validate()?;
    Ok(PagePipeline::standard(options).process(page))
}
