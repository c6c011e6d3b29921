//! Integration tests for page-level table resolution

use image::{GrayImage, Luma};
use pagelift::error::DefectKind;
use pagelift::geometry::Rect;
use pagelift::page::{DetectedCell, PageRaster, PrimaryTable};
use pagelift::raster::draw_outline;
use pagelift::table::grid::RawMergeSpan;
use pagelift::table::TableSource;
use pagelift::{ContentBlock, MergeSpan, PageInput, TableOptions, TableStructureResolver, TextLine, TextSpan};
use pretty_assertions::assert_eq;

fn grid_lines(rows: &[f64], cols: &[f64]) -> Vec<TextLine> {
    let mut lines = Vec::new();
    for (r, y) in rows.iter().enumerate() {
        for (c, x) in cols.iter().enumerate() {
            lines.push(TextLine::new(
                Rect::new(*x, *y, x + 60.0, y + 10.0),
                &format!("r{r}c{c}"),
            ));
        }
    }
    lines
}

fn spanned(bbox: Rect, text: &str) -> TextLine {
    TextLine::new(bbox, text).with_spans(vec![TextSpan::new(bbox, text, 10.0, false)])
}

#[test]
fn test_line_alignment_three_by_three() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.blocks
        .push(ContentBlock::from_lines(grid_lines(&[100.0, 130.0, 160.0], &[50.0, 200.0, 350.0])));

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_eq!(resolved.value.source, Some(TableSource::LineAlignment));
    assert_eq!(resolved.value.len(), 1);

    let table = &resolved.value.tables[0];
    assert_eq!((table.rows(), table.cols()), (3, 3));
    assert_eq!(table.text_grid()[1], vec!["r1c0", "r1c1", "r1c2"]);
    assert_eq!(table.bbox(), Rect::new(50.0, 100.0, 410.0, 170.0));
}

#[test]
fn test_line_alignment_tolerates_baseline_jitter() {
    let mut lines = grid_lines(&[100.0, 130.0, 160.0], &[50.0, 200.0, 350.0]);
    lines[1].bbox.y0 += 3.0;
    lines[5].bbox.y0 -= 2.0;
    lines[7].bbox.x0 += 6.0;
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.blocks.push(ContentBlock::from_lines(lines));

    let resolved = TableStructureResolver::default().resolve(&page);
    let table = &resolved.value.tables[0];
    assert_eq!((table.rows(), table.cols()), (3, 3));
}

#[test]
fn test_two_aligned_rows_are_not_a_table() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    let mut lines = grid_lines(&[100.0, 130.0], &[50.0, 200.0, 350.0]);
    lines.push(TextLine::new(Rect::new(50.0, 400.0, 500.0, 410.0), "a paragraph far below"));
    page.blocks.push(ContentBlock::from_lines(lines));

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_ne!(resolved.value.source, Some(TableSource::LineAlignment));
}

#[test]
fn test_primary_tables_win() {
    let mut page = PageInput::new(2, 600.0, 800.0);
    page.blocks
        .push(ContentBlock::from_lines(grid_lines(&[100.0, 130.0, 160.0], &[50.0, 200.0, 350.0])));
    page.primary_tables.push(PrimaryTable {
        bbox: Rect::new(50.0, 400.0, 350.0, 460.0),
        rows: 2,
        cols: 2,
        cells: vec![
            DetectedCell::new(0, 0, "Item"),
            DetectedCell::new(0, 1, "Qty"),
            DetectedCell::new(1, 0, "bolts"),
            DetectedCell::new(1, 1, "12"),
        ],
        merges: vec![],
    });

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_eq!(resolved.value.source, Some(TableSource::Primary));
    assert!(resolved.is_clean());
    assert_eq!(
        resolved.value.tables[0].text_grid(),
        vec![vec!["Item", "Qty"], vec!["bolts", "12"]]
    );
}

#[test]
fn test_primary_merges_are_rectangularized() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.primary_tables.push(PrimaryTable {
        bbox: Rect::new(0.0, 0.0, 300.0, 90.0),
        rows: 3,
        cols: 3,
        cells: vec![DetectedCell::new(0, 0, "x")],
        merges: vec![
            RawMergeSpan::new(0.0, 0.0, 1.0, 1.0),
            RawMergeSpan::new(1.0, 1.0, 2.0, 2.0),
            RawMergeSpan::new(0.0, 0.0, 5.0, 0.0),
        ],
    });

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_eq!(resolved.value.tables[0].merges().as_slice(), &[MergeSpan::new(0, 0, 2, 2)]);
}

#[test]
fn test_primary_merges_derived_from_cell_boxes() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.primary_tables.push(PrimaryTable {
        bbox: Rect::new(0.0, 0.0, 200.0, 40.0),
        rows: 2,
        cols: 2,
        cells: vec![
            DetectedCell::new(0, 0, "Quarterly").with_bbox(Rect::new(0.0, 0.0, 200.0, 20.0)),
            DetectedCell::new(1, 0, "Q1").with_bbox(Rect::new(0.0, 20.0, 100.0, 40.0)),
            DetectedCell::new(1, 1, "Q2").with_bbox(Rect::new(100.0, 20.0, 200.0, 40.0)),
        ],
        merges: vec![],
    });

    let resolved = TableStructureResolver::default().resolve(&page);
    let table = &resolved.value.tables[0];
    assert_eq!(table.merges().as_slice(), &[MergeSpan::new(0, 0, 0, 1)]);
    assert_eq!(table.column_widths(), &[100.0, 100.0]);
}

#[test]
fn test_raster_contour_grid() {
    let mut image = GrayImage::from_pixel(400, 240, Luma([255]));
    draw_outline(&mut image, 40, 40, 360, 200, 0);

    let mut page = PageInput::new(1, 200.0, 120.0);
    page.raster = Some(PageRaster::new(image, 2.0));
    page.blocks.push(ContentBlock::from_lines(vec![
        spanned(Rect::new(30.0, 30.0, 70.0, 40.0), "left"),
        spanned(Rect::new(110.0, 30.0, 150.0, 40.0), "right"),
        spanned(Rect::new(30.0, 60.0, 70.0, 70.0), "a"),
        spanned(Rect::new(110.0, 60.0, 150.0, 70.0), "b"),
    ]));

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_eq!(resolved.value.source, Some(TableSource::RasterContour));
    let table = &resolved.value.tables[0];
    assert_eq!(table.text_grid(), vec![vec!["left", "right"], vec!["a", "b"]]);
    // Dilation widens the drawn border by one pixel per side
    assert_eq!(table.bbox(), Rect::new(19.5, 19.5, 181.0, 101.0));
}

#[test]
fn test_empty_raster_region_falls_through() {
    let mut image = GrayImage::from_pixel(400, 240, Luma([255]));
    draw_outline(&mut image, 40, 40, 360, 200, 0);

    // The contour holds no text; only the evenly spaced block further down remains
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.raster = Some(PageRaster::new(image, 2.0));
    let lines = (0..5)
        .map(|i| {
            let y = 400.0 + i as f64 * 12.0;
            TextLine::new(Rect::new(50.0, y, 200.0, y + 10.0), &format!("entry {i}"))
        })
        .collect();
    page.blocks.push(ContentBlock::from_lines(lines));

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_eq!(resolved.value.source, Some(TableSource::RunLength));
    let table = &resolved.value.tables[0];
    assert_eq!((table.rows(), table.cols()), (5, 1));
    assert_eq!(table.text_grid()[4], vec!["entry 4"]);
}

#[test]
fn test_loose_block_is_not_run_length_table() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    let lines = (0..5)
        .map(|i| {
            let y = 400.0 + i as f64 * 18.0;
            TextLine::new(Rect::new(50.0, y, 200.0, y + 10.0), &format!("entry {i}"))
        })
        .collect();
    page.blocks.push(ContentBlock::from_lines(lines));

    let resolved = TableStructureResolver::default().resolve(&page);
    assert!(resolved.value.is_empty());
    assert!(resolved.has_defect(DefectKind::StrategyExhausted));
}

#[test]
fn test_custom_thresholds_change_detection() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.blocks
        .push(ContentBlock::from_lines(grid_lines(&[100.0, 130.0], &[50.0, 200.0, 350.0])));
    page.blocks.push(ContentBlock::from_lines(vec![
        TextLine::new(Rect::new(50.0, 600.0, 100.0, 610.0), "x"),
    ]));

    let strict = TableStructureResolver::default().resolve(&page);
    assert!(strict.value.is_empty());

    let relaxed = TableStructureResolver::new(TableOptions::default().with_min_row_groups(2)).resolve(&page);
    assert_eq!(relaxed.value.source, Some(TableSource::LineAlignment));
    assert_eq!(relaxed.value.tables[0].rows(), 2);
}

#[test]
fn test_sparse_row_does_not_split_aligned_table() {
    let mut lines = Vec::new();
    for (r, count) in [2usize, 2, 1, 2, 2].iter().enumerate() {
        let y = 100.0 + 30.0 * r as f64;
        for c in 0..*count {
            let x = 50.0 + 150.0 * c as f64;
            lines.push(TextLine::new(Rect::new(x, y, x + 60.0, y + 10.0), &format!("r{r}c{c}")));
        }
    }
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.blocks.push(ContentBlock::from_lines(lines));

    let resolved = TableStructureResolver::default().resolve(&page);
    assert_eq!(resolved.value.source, Some(TableSource::LineAlignment));
    let table = &resolved.value.tables[0];
    assert_eq!((table.rows(), table.cols()), (4, 2));
    assert_eq!(table.bbox(), Rect::new(50.0, 100.0, 260.0, 230.0));

    let contiguous = TableStructureResolver::new(TableOptions::default().with_contiguous_row_runs(true));
    assert_ne!(contiguous.resolve(&page).value.source, Some(TableSource::LineAlignment));
}

#[test]
fn test_oversized_primary_grid_is_dropped() {
    let mut page = PageInput::new(1, 600.0, 800.0);
    page.blocks
        .push(ContentBlock::from_lines(grid_lines(&[100.0, 130.0, 160.0], &[50.0, 200.0, 350.0])));
    page.primary_tables.push(PrimaryTable {
        bbox: Rect::new(50.0, 400.0, 350.0, 460.0),
        rows: usize::MAX / 2,
        cols: 3,
        cells: vec![DetectedCell::new(0, 0, "a")],
        merges: Vec::new(),
    });

    let resolved = TableStructureResolver::default().resolve(&page);
    assert!(resolved.has_defect(DefectKind::EmptyDetection));
    assert_eq!(resolved.value.source, Some(TableSource::LineAlignment));
    assert_eq!(resolved.value.tables[0].rows(), 3);
}
