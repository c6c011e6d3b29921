//! Standard page stages

use super::output::{ImageOutcome, PageOutput};
use super::PageStage;
use crate::candidate::{CandidateNamespace, CandidateSelector, ImageValidator};
use crate::options::ImageSelectionOptions;
use crate::page::PageInput;
use crate::table::{TableOptions, TableStructureResolver};
use crate::text::{ParagraphSegmenter, SegmenterOptions};
use tracing::debug;

pub const TABLE_STAGE: &str = "tables";
pub const PARAGRAPH_STAGE: &str = "paragraphs";
pub const IMAGE_STAGE: &str = "images";

/// Resolves tables; must run before paragraphs so table text is not repeated.
#[derive(Debug, Default)]
pub struct TableStage {
    resolver: TableStructureResolver,
}

impl TableStage {
    pub fn new(options: TableOptions) -> Self {
        Self {
            resolver: TableStructureResolver::new(options),
        }
    }

    pub fn with_resolver(resolver: TableStructureResolver) -> Self {
        Self { resolver }
    }
}

impl PageStage for TableStage {
    fn name(&self) -> &str {
        TABLE_STAGE
    }

    fn run(&self, page: &PageInput, output: &mut PageOutput) {
        let resolved = self.resolver.resolve(page);
        output.defects.extend(resolved.defects);
        output.tables = resolved.value;
    }
}

/// Segments text blocks outside the tables found so far.
#[derive(Debug, Default)]
pub struct ParagraphStage {
    segmenter: ParagraphSegmenter,
}

impl ParagraphStage {
    pub fn new(options: SegmenterOptions) -> Self {
        Self {
            segmenter: ParagraphSegmenter::new(options),
        }
    }
}

impl PageStage for ParagraphStage {
    fn name(&self) -> &str {
        PARAGRAPH_STAGE
    }

    fn run(&self, page: &PageInput, output: &mut PageOutput) {
        let exclusions = output.tables.regions();
        output.paragraphs = self.segmenter.segment_page(&page.blocks, page.width, &exclusions);
    }
}

/// Picks one payload per raster block.
#[derive(Debug, Default)]
pub struct ImageStage {
    selector: CandidateSelector,
    validator: ImageValidator,
}

impl ImageStage {
    pub fn new(options: ImageSelectionOptions) -> Self {
        Self {
            selector: CandidateSelector::new(options.policy),
            validator: ImageValidator::new(options.min_dimension),
        }
    }
}

impl PageStage for ImageStage {
    fn name(&self) -> &str {
        IMAGE_STAGE
    }

    fn run(&self, page: &PageInput, output: &mut PageOutput) {
        let namespace = CandidateNamespace::for_page(page.page_number);
        for block in &page.rasters {
            let selection = self.selector.select(block.candidates.clone(), &self.validator);
            output.defects.extend(selection.defects());

            let outcome = match selection.selected {
                Some(candidate) => ImageOutcome {
                    resource_id: block.resource_id.clone(),
                    bbox: block.bbox,
                    key: Some(namespace.key(&candidate.method, &candidate.payload)),
                    method: Some(candidate.method),
                    payload: Some(candidate.payload),
                },
                None => {
                    debug!(resource = %block.resource_id, "no usable image candidate");
                    ImageOutcome {
                        resource_id: block.resource_id.clone(),
                        bbox: block.bbox,
                        method: None,
                        key: None,
                        payload: None,
                    }
                }
            };
            output.images.push(outcome);
        }
    }
}
