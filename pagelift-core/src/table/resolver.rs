//! Page-level table resolution
//!
//! Tables from the reader's own detector are adopted as-is, apart from
//! merge-span validation. Only when that detector produced nothing usable
//! does the resolver fall back to its own strategies, which run one at a
//! time in priority order until one of them finds a table.

use super::builder::GridBuilder;
use super::detect::{default_detectors, TableDetector};
use super::{TableList, TableListValidator, TableOptions, TableSource};
use crate::candidate::{first_valid, ExtractionCandidate};
use crate::error::{Defect, DefectKind, Resolved};
use crate::page::PageInput;
use tracing::{debug, warn};

pub struct TableStructureResolver {
    options: TableOptions,
    detectors: Vec<Box<dyn TableDetector>>,
}

impl Default for TableStructureResolver {
    fn default() -> Self {
        Self::new(TableOptions::default())
    }
}

impl std::fmt::Debug for TableStructureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStructureResolver")
            .field("options", &self.options)
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.source().method_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TableStructureResolver {
    /// Resolver with the standard fallback chain.
    pub fn new(options: TableOptions) -> Self {
        Self::with_detectors(options, default_detectors())
    }

    /// Resolver with a custom fallback chain, tried in the given order.
    pub fn with_detectors(options: TableOptions, detectors: Vec<Box<dyn TableDetector>>) -> Self {
        Self { options, detectors }
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn resolve(&self, page: &PageInput) -> Resolved<TableList> {
        let mut defects = Vec::new();

        if !page.primary_tables.is_empty() {
            let primary = self.adopt_primary(page, &mut defects);
            if !primary.is_empty() {
                debug!(page = page.page_number, tables = primary.len(), "using primary detector tables");
                return Resolved::new(primary, defects);
            }
            debug!(page = page.page_number, "primary tables unusable, falling back");
        }

        let candidates = self.detectors.iter().map(|detector| {
            let result = detector.detect(page, &self.options);
            defects.extend(result.defects);
            ExtractionCandidate::new(detector.source().method_name(), result.value)
        });
        let selection = first_valid(candidates, &TableListValidator);

        match selection.selected {
            Some(candidate) => {
                debug!(
                    page = page.page_number,
                    method = %candidate.method,
                    tables = candidate.payload.len(),
                    "fallback strategy found tables"
                );
                Resolved::new(candidate.payload, defects)
            }
            None => {
                warn!(page = page.page_number, "no table strategy produced a table");
                defects.push(Defect::new(
                    DefectKind::StrategyExhausted,
                    format!("page {}: all table strategies empty", page.page_number),
                ));
                Resolved::new(TableList::empty(), defects)
            }
        }
    }

    fn adopt_primary(&self, page: &PageInput, defects: &mut Vec<Defect>) -> TableList {
        let builder = GridBuilder::new(&self.options);
        let mut tables = Vec::with_capacity(page.primary_tables.len());
        for table in &page.primary_tables {
            match builder.from_primary(table) {
                Ok(result) => tables.push(result.drain_into(defects)),
                Err(e) => defects.push(Defect::new(DefectKind::EmptyDetection, e.to_string())),
            }
        }
        TableList::new(tables, TableSource::Primary)
    }
}
