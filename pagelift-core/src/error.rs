//! Error and defect types.
//!
//! Contract violations by the caller surface as [`LayoutError`]. Noise in
//! the input (malformed boxes, impossible merge spans, strategies that find
//! nothing) never aborts a page; it is recorded as a [`Defect`] next to the
//! value that survived.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidGridDimensions { rows: usize, cols: usize },

    #[error("Grid too large: {rows}x{cols} exceeds {max} cells")]
    GridTooLarge { rows: usize, cols: usize, max: usize },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Category of a recoverable problem found while reconstructing a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefectKind {
    /// A fragment carried non-finite or inverted coordinates and was dropped
    MalformedGeometry,
    /// A merge span could not be read as integer grid coordinates
    MalformedSpan,
    /// A merge span started outside the grid
    SpanOutOfBounds,
    /// A detected cell referenced a position outside its table
    InvalidCell,
    /// A detector ran and produced nothing usable
    EmptyDetection,
    /// Every fallback strategy came back empty
    StrategyExhausted,
    /// A selected candidate failed validation
    CandidateRejected,
    /// A pipeline stage panicked
    StageFailed,
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefectKind::MalformedGeometry => "malformed geometry",
            DefectKind::MalformedSpan => "malformed span",
            DefectKind::SpanOutOfBounds => "span out of bounds",
            DefectKind::InvalidCell => "invalid cell",
            DefectKind::EmptyDetection => "empty detection",
            DefectKind::StrategyExhausted => "strategy exhausted",
            DefectKind::CandidateRejected => "candidate rejected",
            DefectKind::StageFailed => "stage failed",
        };
        f.write_str(name)
    }
}

/// A recoverable problem, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Defect {
    pub kind: DefectKind,
    pub detail: String,
}

impl Defect {
    pub fn new(kind: DefectKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// A value together with the defects recorded while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub defects: Vec<Defect>,
}

/// Resolver output; same shape as [`Validated`].
pub type Resolved<T> = Validated<T>;

impl<T> Validated<T> {
    pub fn new(value: T, defects: Vec<Defect>) -> Self {
        Self { value, defects }
    }

    pub fn clean(value: T) -> Self {
        Self {
            value,
            defects: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn has_defect(&self, kind: DefectKind) -> bool {
        self.defects.iter().any(|d| d.kind == kind)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated {
            value: f(self.value),
            defects: self.defects,
        }
    }

    /// Moves the defects into `sink` and returns the value.
    pub fn drain_into(self, sink: &mut Vec<Defect>) -> T {
        sink.extend(self.defects);
        self.value
    }
}
