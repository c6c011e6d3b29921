//! Reconstruct a small invoice page and print what was found.
//!
//! Run with `RUST_LOG=pagelift=debug cargo run --example reconstruct_invoice`
//! to see strategy decisions.

use pagelift::geometry::Rect;
use pagelift::page::{DetectedCell, PrimaryTable, RawLine};
use pagelift::pipeline::Entity;
use pagelift::{reconstruct_page, ExtractionCandidate, LayoutOptions, PageInputBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let page = PageInputBuilder::new(1, 612.0, 792.0)
        .raw_block(
            [72.0, 50.0, 300.0, 70.0],
            vec![RawLine::new([72.0, 50.0, 300.0, 70.0], "Invoice 2041").with_font(20.0, true)],
            false,
        )
        .raw_block(
            [72.0, 100.0, 500.0, 128.0],
            vec![
                RawLine::new([72.0, 100.0, 500.0, 110.0], "Payment is due within thirty days"),
                RawLine::new([72.0, 118.0, 260.0, 128.0], "of the invoice date."),
                RawLine::new([f64::NAN, 0.0, 0.0, 0.0], "dropped"),
            ],
            false,
        )
        .primary_table(PrimaryTable {
            bbox: Rect::new(72.0, 160.0, 472.0, 220.0),
            rows: 3,
            cols: 2,
            cells: vec![
                DetectedCell::new(0, 0, "Item").with_font(11.0, true),
                DetectedCell::new(0, 1, "Amount").with_font(11.0, true),
                DetectedCell::new(1, 0, "Bolts"),
                DetectedCell::new(1, 1, "12.00"),
                DetectedCell::new(2, 0, "Total due: 12.00"),
            ],
            // Reader reported the total row as overlapping spans
            merges: vec![
                pagelift::table::RawMergeSpan::new(2.0, 0.0, 2.0, 1.0),
                pagelift::table::RawMergeSpan::new(2.0, 1.0, 2.0, 4.0),
            ],
        })
        .raw_raster(
            [400.0, 40.0, 540.0, 90.0],
            "logo",
            vec![ExtractionCandidate::new("xref_12", vec![0u8; 16])],
        )
        .build();

    let output = reconstruct_page(&page, &LayoutOptions::default())?;

    for entity in output.entities() {
        match entity {
            Entity::Paragraph(p) => println!("paragraph ({:?}): {}", p.style, p.text().replace('\n', " / ")),
            Entity::Table(t) => {
                println!("table {}x{} from {}", t.rows(), t.cols(), t.source().method_name());
                for row in t.text_grid() {
                    println!("  | {} |", row.join(" | "));
                }
                for span in t.merges() {
                    println!("  merged {span}");
                }
            }
            Entity::Image(i) => println!(
                "image {}: {}",
                i.resource_id,
                i.method.as_deref().unwrap_or("not recovered")
            ),
        }
    }
    for defect in &output.defects {
        println!("defect: {defect}");
    }
    Ok(())
}
