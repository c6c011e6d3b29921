//! Validation of recovered image payloads

use super::CandidateValidator;

/// Rejects payloads that do not decode or are too small to be real images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageValidator {
    /// Minimum width and height in pixels
    pub min_dimension: u32,
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self { min_dimension: 10 }
    }
}

impl ImageValidator {
    pub fn new(min_dimension: u32) -> Self {
        Self { min_dimension }
    }
}

impl CandidateValidator<Vec<u8>> for ImageValidator {
    fn validate(&self, payload: &Vec<u8>) -> Result<(), String> {
        let decoded = ::image::load_from_memory(payload).map_err(|e| format!("undecodable: {e}"))?;
        let (width, height) = (decoded.width(), decoded.height());
        if width < self.min_dimension || height < self.min_dimension {
            return Err(format!(
                "{width}x{height} is below the {0}x{0} minimum",
                self.min_dimension
            ));
        }
        Ok(())
    }
}
