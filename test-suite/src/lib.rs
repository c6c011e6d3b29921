//! Test Suite for pagelift
//!
//! Synthetic page generators, proptest strategies and shared helpers for
//! exercising layout reconstruction on inputs larger and noisier than the
//! unit tests use.

pub mod generators;
pub mod strategies;

pub use generators::{bordered_table_raster, png_bytes, random_batch, Expected, SyntheticPage, SyntheticPageBuilder};

/// Common test utilities
pub mod utils {
    use pagelift::table::Table;

    /// Install a `RUST_LOG`-driven subscriber once per test binary.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Check the merge-span contract of a finalized table.
    pub fn check_rectangularized(table: &Table) -> anyhow::Result<()> {
        let spans = table.merges().as_slice();
        for (i, a) in spans.iter().enumerate() {
            if a.row_end >= table.rows() || a.col_end >= table.cols() {
                anyhow::bail!("{a} outside {}x{} table", table.rows(), table.cols());
            }
            if let Some(b) = spans[i + 1..].iter().find(|b| a.overlaps(b)) {
                anyhow::bail!("{a} overlaps {b}");
            }
        }
        Ok(())
    }
}
