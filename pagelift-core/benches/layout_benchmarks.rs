//! Layout reconstruction benchmarks
//!
//! Measures the per-page building blocks: merge-span validation, paragraph
//! segmentation, and each table detection strategy.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, Luma};
use pagelift::geometry::Rect;
use pagelift::page::PageRaster;
use pagelift::raster::{detect_regions, draw_outline};
use pagelift::table::grid::RawMergeSpan;
use pagelift::{
    CellGridValidator, ContentBlock, PageInput, ParagraphSegmenter, SegmenterOptions, TableOptions,
    TableStructureResolver, TextLine,
};

fn spans(count: usize, size: usize) -> Vec<RawMergeSpan> {
    (0..count)
        .map(|i| {
            let r = (i * 7) % size;
            let c = (i * 13) % size;
            RawMergeSpan::new(r as f64, c as f64, (r + i % 3) as f64, (c + i % 4) as f64)
        })
        .collect()
}

fn prose_block(lines: usize) -> ContentBlock {
    ContentBlock::from_lines(
        (0..lines)
            .map(|i| {
                let y = 72.0 + i as f64 * 18.0;
                // Every seventh line opens a new paragraph after a wide gap
                let y = y + (i / 7) as f64 * 20.0;
                TextLine::new(Rect::new(72.0, y, 500.0, y + 10.0), "lines of positioned text")
            })
            .collect(),
    )
}

fn aligned_page(rows: usize, cols: usize) -> PageInput {
    let mut lines = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let (x, y) = (50.0 + c as f64 * 100.0, 60.0 + r as f64 * 25.0);
            lines.push(TextLine::new(Rect::new(x, y, x + 60.0, y + 10.0), &format!("{r}:{c}")));
        }
    }
    let mut page = PageInput::new(1, 612.0, 792.0);
    page.blocks.push(ContentBlock::from_lines(lines));
    page
}

fn ruled_raster(tables: u32) -> GrayImage {
    let mut image = GrayImage::from_pixel(1224, 1584, Luma([255]));
    for t in 0..tables {
        let y0 = 40 + t * 300;
        draw_outline(&mut image, 100, y0, 1100, y0 + 240, 0);
        draw_outline(&mut image, 100, y0 + 120, 1100, y0 + 120, 0);
        draw_outline(&mut image, 600, y0, 600, y0 + 240, 0);
    }
    image
}

fn benchmark_merge_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_validation");
    let validator = CellGridValidator::new(40, 40).unwrap();

    for count in [10, 100, 1000] {
        let input = spans(count, 40);
        group.bench_with_input(BenchmarkId::new("validate", count), &input, |b, input| {
            b.iter(|| black_box(validator.validate(black_box(input))))
        });
    }
    group.finish();
}

fn benchmark_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");
    let segmenter = ParagraphSegmenter::new(SegmenterOptions::default());

    for lines in [10, 100, 1000] {
        let block = prose_block(lines);
        group.bench_with_input(BenchmarkId::new("segment", lines), &block, |b, block| {
            b.iter(|| black_box(segmenter.segment(black_box(block), 612.0)))
        });
    }
    group.finish();
}

fn benchmark_table_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_detection");
    group.sample_size(30);
    let resolver = TableStructureResolver::new(TableOptions::default());

    for rows in [5, 20, 60] {
        let page = aligned_page(rows, 5);
        group.bench_with_input(BenchmarkId::new("line_alignment", rows), &page, |b, page| {
            b.iter(|| black_box(resolver.resolve(black_box(page))))
        });
    }

    for tables in [1, 4] {
        let image = ruled_raster(tables);
        group.bench_with_input(BenchmarkId::new("contours", tables), &image, |b, image| {
            b.iter(|| black_box(detect_regions(black_box(image), 200, 1000)))
        });

        let mut page = PageInput::new(1, 612.0, 792.0);
        page.raster = Some(PageRaster::new(image.clone(), 2.0));
        group.bench_with_input(BenchmarkId::new("raster_resolve", tables), &page, |b, page| {
            b.iter(|| black_box(resolver.resolve(black_box(page))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_merge_validation,
    benchmark_segmentation,
    benchmark_table_detection
);
criterion_main!(benches);
