//! Raster helpers for contour-based region detection
//!
//! The page rendering arrives as a grayscale image with dark ink on a light
//! background. Table borders are found by inverting it into a binary mask,
//! thickening strokes by one pixel and tracing the outer contours.

use crate::geometry::Rect;
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;

/// Pixel-space bounding box of a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBox {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Map back to page points for an image rendered at `scale`.
    pub fn to_page(&self, scale: f64) -> Rect {
        Rect::from_pixels(self.x, self.y, self.width, self.height, scale)
    }
}

/// Foreground (255) where the source is darker than `threshold`.
pub fn binarize_inverted(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel[0] < threshold { 255u8 } else { 0u8 };
        out.put_pixel(x, y, Luma([value]));
    }
    out
}

/// Grow foreground by one pixel in every direction (3x3 square kernel).
pub fn dilate_square(mask: &GrayImage) -> GrayImage {
    dilate(mask, Norm::LInf, 1)
}

/// Bounding boxes of outermost contours with area above `min_area` pixels.
pub fn outer_contour_boxes(mask: &GrayImage, min_area: u32) -> Vec<PixelBox> {
    let contours: Vec<Contour<u32>> = find_contours(mask);
    contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(bounding_box)
        .filter(|b| b.area() > u64::from(min_area))
        .collect()
}

/// Full pipeline: threshold, dilate, trace.
pub fn detect_regions(image: &GrayImage, threshold: u8, min_area: u32) -> Vec<PixelBox> {
    let mask = dilate_square(&binarize_inverted(image, threshold));
    outer_contour_boxes(&mask, min_area)
}

fn bounding_box(contour: &Contour<u32>) -> Option<PixelBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(PixelBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Draw a rectangular outline, used to synthesize bordered tables.
pub fn draw_outline(image: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let (x1, y1) = (x1.min(w - 1), y1.min(h - 1));
    for x in x0.min(x1)..=x1 {
        image.put_pixel(x, y0.min(y1), Luma([value]));
        image.put_pixel(x, y1, Luma([value]));
    }
    for y in y0.min(y1)..=y1 {
        image.put_pixel(x0.min(x1), y, Luma([value]));
        image.put_pixel(x1, y, Luma([value]));
    }
}
