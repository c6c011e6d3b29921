//! Page Generators
//!
//! Deterministic, seeded builders for synthetic page input.

pub mod pages;
pub mod rasters;

pub use pages::{random_batch, Expected, SyntheticPage, SyntheticPageBuilder};
pub use rasters::{bordered_table_raster, png_bytes};
