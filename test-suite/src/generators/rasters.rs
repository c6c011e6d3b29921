//! Raster fixtures

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use pagelift::raster::draw_outline;
use std::io::Cursor;

/// A white page rendering with a ruled `rows x cols` grid.
///
/// `bbox` is `[x0, y0, x1, y1]` in page points; the image is `page_size *
/// scale` pixels.
pub fn bordered_table_raster(
    page_size: (f64, f64),
    bbox: [f64; 4],
    rows: usize,
    cols: usize,
    scale: f64,
) -> GrayImage {
    let width = (page_size.0 * scale).ceil() as u32;
    let height = (page_size.1 * scale).ceil() as u32;
    let mut image = GrayImage::from_pixel(width, height, Luma([255]));

    let px = |v: f64| (v * scale).round() as u32;
    let (x0, y0, x1, y1) = (px(bbox[0]), px(bbox[1]), px(bbox[2]), px(bbox[3]));
    draw_outline(&mut image, x0, y0, x1, y1, 0);

    let rows = rows.max(1) as u32;
    let cols = cols.max(1) as u32;
    for r in 1..rows {
        let y = y0 + (y1 - y0) * r / rows;
        draw_outline(&mut image, x0, y, x1, y, 0);
    }
    for c in 1..cols {
        let x = x0 + (x1 - x0) * c / cols;
        draw_outline(&mut image, x, y0, x, y1, 0);
    }
    image
}

/// PNG bytes of a `width x height` gradient.
pub fn png_bytes(width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
    let image = GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
