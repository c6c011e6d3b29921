//! Basic geometric types for page layout
//!
//! Coordinates are page points with the origin at the top-left corner and
//! `y` growing downwards, which is how the upstream reader reports boxes.

use crate::error::{LayoutError, Result};

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle `(x0, y0, x1, y1)`.
///
/// Always holds `x1 >= x0` and `y1 >= y0`. Zero-width or zero-height
/// rectangles are valid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from two corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a rectangle, rejecting non-finite or inverted coordinates.
    pub fn try_new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(LayoutError::InvalidGeometry(format!(
                "non-finite rectangle ({x0}, {y0}, {x1}, {y1})"
            )));
        }
        if x1 < x0 || y1 < y0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "inverted rectangle ({x0}, {y0}, {x1}, {y1})"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Create a rectangle from position and size
    pub fn from_position_and_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Map a pixel rectangle of an image rendered at `scale` back to page points.
    pub fn from_pixels(x: u32, y: u32, width: u32, height: u32, scale: f64) -> Self {
        Self::from_position_and_size(
            f64::from(x) / scale,
            f64::from(y) / scale,
            f64::from(width) / scale,
            f64::from(height) / scale,
        )
    }

    /// Get the width
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Get the height
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Get the center point
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Closed-interval containment.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x0 && point.x <= self.x1 && point.y >= self.y0 && point.y <= self.y1
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !rects_overlap(self, other) {
            return None;
        }
        Some(Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    /// Share of this rectangle's area that lies inside `other`.
    ///
    /// Degenerate rectangles report 1.0 when they touch `other` at all.
    pub fn overlap_ratio(&self, other: &Rect) -> f64 {
        match self.intersection(other) {
            None => 0.0,
            Some(_) if self.area() <= f64::EPSILON => 1.0,
            Some(inter) => inter.area() / self.area(),
        }
    }
}

impl TryFrom<[f64; 4]> for Rect {
    type Error = LayoutError;

    fn try_from(value: [f64; 4]) -> Result<Self> {
        Rect::try_new(value[0], value[1], value[2], value[3])
    }
}

impl From<Rect> for [f64; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x0, rect.y0, rect.x1, rect.y1]
    }
}

/// Whether the closed intervals `[a0, a1]` and `[b0, b1]` share a point.
pub fn intervals_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    a0 <= b1 && b0 <= a1
}

/// Whether two rectangles overlap. Touching edges count as overlap.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    intervals_overlap(a.x0, a.x1, b.x0, b.x1) && intervals_overlap(a.y0, a.y1, b.y0, b.y1)
}

/// Bounding union of two rectangles.
pub fn union(a: &Rect, b: &Rect) -> Rect {
    Rect {
        x0: a.x0.min(b.x0),
        y0: a.y0.min(b.y0),
        x1: a.x1.max(b.x1),
        y1: a.y1.max(b.y1),
    }
}

/// Bounding union of any number of rectangles, `None` when empty.
pub fn union_all<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects
        .into_iter()
        .fold(None, |acc: Option<Rect>, r| match acc {
            None => Some(*r),
            Some(u) => Some(union(&u, r)),
        })
}

/// Group scalar positions into clusters and return each cluster's mean.
///
/// Values are sorted first; a value joins the current cluster when it is
/// within `tolerance` of the cluster's last member. Non-finite values are
/// ignored.
pub fn cluster_positions(values: &[f64], tolerance: f64) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(cluster) if cluster.last().is_some_and(|last| value - last <= tolerance) => {
                cluster.push(value)
            }
            _ => clusters.push(vec![value]),
        }
    }

    clusters
        .iter()
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect()
}
