//! Progress reporting for page batches

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of batch progress
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub total_pages: usize,
    pub completed_pages: usize,
    /// Pages whose processing panicked
    pub failed_pages: usize,
    pub start_time: Instant,
}

impl ProgressInfo {
    /// Get progress percentage (0.0 - 100.0)
    pub fn percentage(&self) -> f64 {
        if self.total_pages == 0 {
            100.0
        } else {
            (self.processed() as f64 / self.total_pages as f64) * 100.0
        }
    }

    pub fn processed(&self) -> usize {
        self.completed_pages + self.failed_pages
    }

    pub fn is_complete(&self) -> bool {
        self.processed() >= self.total_pages
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn format_progress(&self) -> String {
        format!(
            "{}/{} pages ({:.1}%) - {} failed",
            self.processed(),
            self.total_pages,
            self.percentage(),
            self.failed_pages
        )
    }
}

/// Shared counters updated by workers
pub(crate) struct PageProgress {
    total_pages: usize,
    completed_pages: AtomicUsize,
    failed_pages: AtomicUsize,
    start_time: Instant,
}

impl PageProgress {
    pub(crate) fn new(total_pages: usize) -> Self {
        Self {
            total_pages,
            completed_pages: AtomicUsize::new(0),
            failed_pages: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub(crate) fn complete_page(&self) {
        self.completed_pages.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn fail_page(&self) {
        self.failed_pages.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn info(&self) -> ProgressInfo {
        ProgressInfo {
            total_pages: self.total_pages,
            completed_pages: self.completed_pages.load(Ordering::SeqCst),
            failed_pages: self.failed_pages.load(Ordering::SeqCst),
            start_time: self.start_time,
        }
    }
}

/// Trait for progress callbacks
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, info: &ProgressInfo);
}

impl<F> ProgressCallback for F
where
    F: Fn(&ProgressInfo) + Send + Sync,
{
    fn on_progress(&self, info: &ProgressInfo) {
        self(info)
    }
}
