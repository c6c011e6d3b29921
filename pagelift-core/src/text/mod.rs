//! Text-side reconstruction: normalization, list markers, alignment and
//! paragraph segmentation.

pub mod layout;
pub mod markers;
pub mod normalize;
pub mod paragraph;

pub use layout::{detect_layout, Alignment, AlignmentOptions};
pub use markers::{detect_list_marker, ListMarker, BULLET_MARKERS};
pub use normalize::normalize_text;
pub use paragraph::{BreakReason, Paragraph, ParagraphSegmenter, ParagraphStyle, Segment, SegmenterOptions};
