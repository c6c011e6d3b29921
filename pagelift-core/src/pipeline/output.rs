//! Reconstructed page output

use crate::error::{Defect, DefectKind};
use crate::geometry::Rect;
use crate::table::{Table, TableList};
use crate::text::Paragraph;

/// The image chosen for one raster block, if any.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageOutcome {
    pub resource_id: String,
    pub bbox: Rect,
    /// Winning extraction method, `None` when nothing was usable
    pub method: Option<String>,
    /// Page-scoped staging key of the winning payload
    pub key: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub payload: Option<Vec<u8>>,
}

impl ImageOutcome {
    pub fn is_recovered(&self) -> bool {
        self.payload.is_some()
    }
}

/// A reconstructed entity, borrowed from a [`PageOutput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    Paragraph(&'a Paragraph),
    Table(&'a Table),
    Image(&'a ImageOutcome),
}

impl Entity<'_> {
    pub fn bbox(&self) -> Rect {
        match self {
            Entity::Paragraph(p) => p.bbox,
            Entity::Table(t) => t.bbox(),
            Entity::Image(i) => i.bbox,
        }
    }
}

/// Everything reconstructed for one page.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageOutput {
    pub page_number: u32,
    pub paragraphs: Vec<Paragraph>,
    pub tables: TableList,
    pub images: Vec<ImageOutcome>,
    pub defects: Vec<Defect>,
}

impl PageOutput {
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }

    /// Output for a page whose processing failed outright.
    pub fn failed(page_number: u32, detail: impl Into<String>) -> Self {
        let mut output = Self::new(page_number);
        output.defects.push(Defect::new(DefectKind::StageFailed, detail));
        output
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty() && self.images.is_empty()
    }

    pub fn has_defect(&self, kind: DefectKind) -> bool {
        self.defects.iter().any(|d| d.kind == kind)
    }

    /// All entities ordered top to bottom, then left to right.
    pub fn entities(&self) -> Vec<Entity<'_>> {
        let mut entities: Vec<Entity<'_>> = self
            .paragraphs
            .iter()
            .map(Entity::Paragraph)
            .chain(self.tables.tables.iter().map(Entity::Table))
            .chain(self.images.iter().map(Entity::Image))
            .collect();
        entities.sort_by(|a, b| {
            let (a, b) = (a.bbox(), b.bbox());
            a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0))
        });
        entities
    }
}
