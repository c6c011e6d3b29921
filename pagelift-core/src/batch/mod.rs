//! Page-parallel batch processing
//!
//! Pages are independent, so a batch fans them out over a fixed set of
//! worker threads sharing one [`PagePipeline`]. A page that panics yields
//! an empty output carrying a `StageFailed` defect; the rest of the batch
//! carries on. Outputs always come back in input order.
//!
//! # Example
//!
//! ```rust
//! use pagelift::batch::{BatchOptions, BatchProcessor};
//! use pagelift::pipeline::PagePipeline;
//! use pagelift::PageInput;
//!
//! let options = BatchOptions::default()
//!     .with_parallelism(2)
//!     .with_progress_callback(|progress| {
//!         println!("{}", progress.format_progress());
//!     });
//! let processor = BatchProcessor::new(PagePipeline::default(), options);
//!
//! let pages = (1..=3).map(|n| PageInput::new(n, 612.0, 792.0)).collect();
//! let summary = processor.process(pages);
//! assert_eq!(summary.outputs.len(), 3);
//! assert_eq!(summary.failed_pages, 0);
//! ```

use crate::page::PageInput;
use crate::pipeline::{PageOutput, PagePipeline};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

pub mod progress;
mod worker;

pub use progress::{ProgressCallback, ProgressInfo};

/// Options for batch processing
#[derive(Clone)]
pub struct BatchOptions {
    /// Number of parallel workers
    pub parallelism: usize,
    /// Called after every page
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get().min(8),
            progress_callback: None,
        }
    }
}

impl std::fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("parallelism", &self.parallelism)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl BatchOptions {
    /// Set the number of parallel workers
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Set progress callback
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressInfo) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }
}

/// Result of a batch run
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// One output per input page, in input order
    pub outputs: Vec<PageOutput>,
    /// Pages whose processing panicked
    pub failed_pages: usize,
    /// Pages with at least one defect, failed pages included
    pub pages_with_defects: usize,
    pub duration: Duration,
}

impl BatchSummary {
    pub fn total_pages(&self) -> usize {
        self.outputs.len()
    }

    pub fn defect_count(&self) -> usize {
        self.outputs.iter().map(|o| o.defects.len()).sum()
    }
}

/// Runs a pipeline over many pages at once.
#[derive(Debug)]
pub struct BatchProcessor {
    pipeline: PagePipeline,
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(pipeline: PagePipeline, options: BatchOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn pipeline(&self) -> &PagePipeline {
        &self.pipeline
    }

    pub fn process(&self, pages: Vec<PageInput>) -> BatchSummary {
        let start = Instant::now();
        let progress = progress::PageProgress::new(pages.len());
        let callback = self.options.progress_callback.as_deref();

        let outputs = worker::run_pages(
            &self.pipeline,
            pages,
            self.options.parallelism,
            &progress,
            callback,
        );

        let failed_pages = progress.info().failed_pages;
        let pages_with_defects = outputs.iter().filter(|o| !o.defects.is_empty()).count();
        let duration = start.elapsed();
        info!(
            pages = outputs.len(),
            failed = failed_pages,
            with_defects = pages_with_defects,
            elapsed_ms = duration.as_millis() as u64,
            "batch finished"
        );

        BatchSummary {
            outputs,
            failed_pages,
            pages_with_defects,
            duration,
        }
    }
}
