//! Engine-wide configuration

use crate::candidate::SelectionPolicy;
use crate::error::{LayoutError, Result};
use crate::table::TableOptions;
use crate::text::SegmenterOptions;

/// Options for picking one image payload per raster block
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImageSelectionOptions {
    pub policy: SelectionPolicy,
    /// Decoded images smaller than this on either side are rejected
    pub min_dimension: u32,
}

impl Default for ImageSelectionOptions {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            min_dimension: 10,
        }
    }
}

/// All tunable thresholds, grouped by component.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    pub segmenter: SegmenterOptions,
    pub tables: TableOptions,
    pub images: ImageSelectionOptions,
}

impl LayoutOptions {
    pub fn with_segmenter(mut self, segmenter: SegmenterOptions) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_tables(mut self, tables: TableOptions) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_images(mut self, images: ImageSelectionOptions) -> Self {
        self.images = images;
        self
    }

    /// Reject thresholds that would make a component misbehave.
    pub fn validate(&self) -> Result<()> {
        let s = &self.segmenter;
        positive("segmenter.spacing_factor", s.spacing_factor)?;
        positive("segmenter.default_gap", s.default_gap)?;
        non_negative("segmenter.indent_tolerance", s.indent_tolerance)?;
        non_negative("segmenter.gap_sample_min", s.gap_sample_min)?;
        if s.gap_sample_min >= s.gap_sample_max {
            return Err(LayoutError::InvalidConfiguration(format!(
                "segmenter.gap_sample_min ({}) must be below gap_sample_max ({})",
                s.gap_sample_min, s.gap_sample_max
            )));
        }
        let align = &s.alignment;
        positive("segmenter.alignment.center_tolerance_ratio", align.center_tolerance_ratio)?;
        positive("segmenter.alignment.center_max_width_ratio", align.center_max_width_ratio)?;

        let t = &self.tables;
        positive("tables.row_epsilon", t.row_epsilon)?;
        positive("tables.column_tolerance", t.column_tolerance)?;
        positive("tables.gap_to_height_ratio", t.gap_to_height_ratio)?;
        non_negative("tables.gap_variance_limit", t.gap_variance_limit)?;
        if t.min_row_groups == 0 {
            return Err(LayoutError::InvalidConfiguration(
                "tables.min_row_groups must be at least 1".to_string(),
            ));
        }
        if t.max_cells == 0 {
            return Err(LayoutError::InvalidConfiguration(
                "tables.max_cells must be at least 1".to_string(),
            ));
        }
        if t.min_run_lines < 2 {
            return Err(LayoutError::InvalidConfiguration(
                "tables.min_run_lines must be at least 2".to_string(),
            ));
        }

        if self.images.min_dimension == 0 {
            return Err(LayoutError::InvalidConfiguration(
                "images.min_dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file.
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfiguration(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfiguration(format!(
            "{name} must be zero or positive, got {value}"
        )))
    }
}
