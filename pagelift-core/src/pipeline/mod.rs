//! Per-page reconstruction pipeline
//!
//! A pipeline is an ordered list of [`PageStage`]s sharing one
//! [`PageOutput`]. Stages are swappable by name, so a caller can replace
//! the table strategy or drop image selection without touching the rest.
//!
//! # Example
//!
//! ```rust
//! use pagelift::pipeline::PagePipeline;
//! use pagelift::{LayoutOptions, PageInput};
//!
//! let pipeline = PagePipeline::standard(&LayoutOptions::default());
//! let output = pipeline.process(&PageInput::new(1, 612.0, 792.0));
//! assert!(output.is_empty());
//! ```

pub mod output;
pub mod stages;

pub use output::{Entity, ImageOutcome, PageOutput};
pub use stages::{ImageStage, ParagraphStage, TableStage, IMAGE_STAGE, PARAGRAPH_STAGE, TABLE_STAGE};

use crate::options::LayoutOptions;
use crate::page::PageInput;
use tracing::{debug, debug_span};

/// One step of page reconstruction.
pub trait PageStage: Send + Sync {
    /// Stable name used to replace or remove the stage.
    fn name(&self) -> &str;

    /// Reads the page and adds results or defects to `output`.
    fn run(&self, page: &PageInput, output: &mut PageOutput);
}

pub struct PagePipeline {
    stages: Vec<Box<dyn PageStage>>,
}

impl std::fmt::Debug for PagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagePipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Default for PagePipeline {
    fn default() -> Self {
        Self::standard(&LayoutOptions::default())
    }
}

impl PagePipeline {
    /// Tables, then paragraphs, then images.
    pub fn standard(options: &LayoutOptions) -> Self {
        Self::builder()
            .with_stage(TableStage::new(options.tables.clone()))
            .with_stage(ParagraphStage::new(options.segmenter.clone()))
            .with_stage(ImageStage::new(options.images.clone()))
            .build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over `page`. Ingest defects are carried into the output.
    pub fn process(&self, page: &PageInput) -> PageOutput {
        let _span = debug_span!("page", page = page.page_number).entered();
        let mut output = PageOutput::new(page.page_number);
        output.defects.extend(page.ingest_defects.iter().cloned());

        for stage in &self.stages {
            let before = output.defects.len();
            stage.run(page, &mut output);
            debug!(
                stage = stage.name(),
                new_defects = output.defects.len() - before,
                "stage finished"
            );
        }
        output
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn PageStage>>,
}

impl PipelineBuilder {
    /// Append a stage.
    pub fn with_stage<S: PageStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Replace the stage called `name` in place, or append when absent.
    pub fn replace_stage<S: PageStage + 'static>(mut self, name: &str, stage: S) -> Self {
        match self.stages.iter().position(|s| s.name() == name) {
            Some(idx) => self.stages[idx] = Box::new(stage),
            None => self.stages.push(Box::new(stage)),
        }
        self
    }

    pub fn without_stage(mut self, name: &str) -> Self {
        self.stages.retain(|s| s.name() != name);
        self
    }

    pub fn build(self) -> PagePipeline {
        PagePipeline { stages: self.stages }
    }
}

impl PagePipeline {
    /// Builder seeded with this pipeline's stages.
    pub fn into_builder(self) -> PipelineBuilder {
        PipelineBuilder { stages: self.stages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Defect, DefectKind};
    use crate::geometry::Rect;
    use crate::page::{ContentBlock, TextLine};

    struct Marker(&'static str);

    impl PageStage for Marker {
        fn name(&self) -> &str {
            self.0
        }

        fn run(&self, _page: &PageInput, output: &mut PageOutput) {
            output.defects.push(Defect::new(DefectKind::StageFailed, self.0));
        }
    }

    #[test]
    fn test_standard_stage_order() {
        let pipeline = PagePipeline::default();
        assert_eq!(pipeline.stage_names(), vec![TABLE_STAGE, PARAGRAPH_STAGE, IMAGE_STAGE]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let pipeline = PagePipeline::default()
            .into_builder()
            .replace_stage(PARAGRAPH_STAGE, Marker("custom"))
            .build();
        assert_eq!(pipeline.stage_names(), vec![TABLE_STAGE, "custom", IMAGE_STAGE]);
    }

    #[test]
    fn test_replace_missing_appends() {
        let pipeline = PagePipeline::builder().replace_stage("x", Marker("x")).build();
        assert_eq!(pipeline.stage_names(), vec!["x"]);
    }

    #[test]
    fn test_without_stage() {
        let pipeline = PagePipeline::default().into_builder().without_stage(IMAGE_STAGE).build();
        assert_eq!(pipeline.stage_names(), vec![TABLE_STAGE, PARAGRAPH_STAGE]);
    }

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = PagePipeline::builder()
            .with_stage(Marker("a"))
            .with_stage(Marker("b"))
            .build();
        let output = pipeline.process(&PageInput::new(3, 100.0, 100.0));
        let details: Vec<_> = output.defects.iter().map(|d| d.detail.as_str()).collect();
        assert_eq!(details, vec!["a", "b"]);
        assert_eq!(output.page_number, 3);
    }

    #[test]
    fn test_ingest_defects_carried() {
        let mut page = PageInput::new(1, 100.0, 100.0);
        page.ingest_defects.push(Defect::new(DefectKind::MalformedGeometry, "line 0"));
        let output = PagePipeline::builder().build().process(&page);
        assert!(output.has_defect(DefectKind::MalformedGeometry));
    }

    #[test]
    fn test_standard_pipeline_segments_prose() {
        let mut page = PageInput::new(1, 600.0, 800.0);
        page.blocks.push(ContentBlock::from_lines(vec![
            TextLine::new(Rect::new(50.0, 100.0, 400.0, 112.0), "a short paragraph."),
        ]));
        let output = PagePipeline::default().process(&page);
        assert_eq!(output.paragraphs.len(), 1);
        assert_eq!(output.paragraphs[0].text(), "a short paragraph.");
    }
}
