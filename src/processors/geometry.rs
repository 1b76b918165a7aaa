//! Geometric primitives used by the detection stages.
//!
//! Pixel positions are integer [`PixelCoord`]s; centers and directions are
//! floating [`Point`]s. Bounding boxes are inclusive on both ends.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use std::f32::consts::PI;

/// A 2D point or vector with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(self) -> Option<Point> {
        let length = self.length();
        if length > f32::EPSILON && length.is_finite() {
            Some(Point::new(self.x / length, self.y / length))
        } else {
            None
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Integer pixel position (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel.
    pub fn distance(self, other: PixelCoord) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A pixel together with its stroke width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSample {
    pub coord: PixelCoord,
    pub width: f32,
}

/// Axis-aligned pixel bounding box, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PixelBox {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Computes the bounding box of a set of pixels, or `None` if it is empty.
    pub fn enclosing(pixels: &[PixelCoord]) -> Option<Self> {
        let (min_x, max_x) = pixels.iter().map(|p| p.x).minmax().into_option()?;
        let (min_y, max_y) = pixels.iter().map(|p| p.y).minmax().into_option()?;
        Some(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Distance between the extreme columns (`max_x - min_x`).
    #[inline]
    pub fn span_x(&self) -> u32 {
        self.max_x - self.min_x
    }

    /// Distance between the extreme rows (`max_y - min_y`).
    #[inline]
    pub fn span_y(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// Number of columns covered.
    #[inline]
    pub fn width(&self) -> u32 {
        self.span_x() + 1
    }

    /// Number of rows covered.
    #[inline]
    pub fn height(&self) -> u32 {
        self.span_y() + 1
    }

    /// Midpoint of the extreme coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            (self.max_x + self.min_x) as f32 / 2.0,
            (self.max_y + self.min_y) as f32 / 2.0,
        )
    }

    /// Whether a point lies inside the box, edges included.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x as f32
            && point.x <= self.max_x as f32
            && point.y >= self.min_y as f32
            && point.y <= self.max_y as f32
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &PixelBox) -> PixelBox {
        PixelBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// The four corners, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x as f32, self.min_y as f32),
            Point::new(self.max_x as f32, self.min_y as f32),
            Point::new(self.max_x as f32, self.max_y as f32),
            Point::new(self.min_x as f32, self.max_y as f32),
        ]
    }
}

/// Extents of the smallest-area box found by [`min_area_extent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedExtent {
    /// Extent along the rotated x axis.
    pub length: f32,
    /// Extent along the rotated y axis.
    pub width: f32,
    /// Rotation angle in radians.
    pub angle: f32,
}

impl RotatedExtent {
    pub fn area(&self) -> f32 {
        self.length * self.width
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.length / self.width
    }
}

/// Searches the minimal-area bounding box of a pixel set over discrete rotations.
///
/// The axis-aligned box is the initial candidate. Each angle `k·π/divisions` below
/// `π/2` then rotates every pixel by `(x·cos − y·sin, x·sin + y·cos)`; extents are
/// `max − min + 1` and a rotation replaces the candidate only if its area is
/// strictly smaller.
///
/// # Arguments
///
/// * `pixels` - The component's pixels.
/// * `bbox` - Their axis-aligned bounding box.
/// * `divisions` - Number of increments per half turn.
pub fn min_area_extent(pixels: &[PixelCoord], bbox: &PixelBox, divisions: u32) -> RotatedExtent {
    let mut best = RotatedExtent {
        length: bbox.width() as f32,
        width: bbox.height() as f32,
        angle: 0.0,
    };
    let mut best_area = best.area();

    let increment = PI / divisions.max(1) as f32;
    for k in 1..divisions / 2 {
        let angle = k as f32 * increment;
        let (sin, cos) = angle.sin_cos();

        let rotated_x = pixels.iter().map(|p| p.x as f32 * cos - p.y as f32 * sin);
        let rotated_y = pixels.iter().map(|p| p.x as f32 * sin + p.y as f32 * cos);
        let (Some((min_x, max_x)), Some((min_y, max_y))) = (
            rotated_x.minmax_by(f32::total_cmp).into_option(),
            rotated_y.minmax_by(f32::total_cmp).into_option(),
        ) else {
            return best;
        };

        let length = max_x - min_x + 1.0;
        let width = max_y - min_y + 1.0;
        let area = length * width;
        if area < best_area {
            best_area = area;
            best = RotatedExtent {
                length,
                width,
                angle,
            };
        }
    }
    best
}

/// Returns true when `1/max_ratio < ratio < max_ratio`. Both bounds are excluded.
#[inline]
pub fn ratio_within(ratio: f32, max_ratio: f32) -> bool {
    ratio > 1.0 / max_ratio && ratio < max_ratio
}

/// Angle in radians between two unit vectors, with the dot product clamped
/// to `[-1, 1]` so rounding never yields NaN.
#[inline]
pub fn angle_between(a: Point, b: Point) -> f32 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_pixels(x0: u32, y0: u32, w: u32, h: u32) -> Vec<PixelCoord> {
        (y0..y0 + h)
            .flat_map(|y| (x0..x0 + w).map(move |x| PixelCoord::new(x, y)))
            .collect()
    }

    #[test]
    fn test_ratio_within_excludes_bounds() {
        assert!(ratio_within(1.0, 2.0));
        assert!(ratio_within(1.99, 2.0));
        assert!(ratio_within(0.51, 2.0));
        assert!(!ratio_within(2.0, 2.0));
        assert!(!ratio_within(0.5, 2.0));
        assert!(!ratio_within(5.0, 3.0));
    }

    #[test]
    fn test_angle_between_clamps_rounding() {
        let a = Point::new(1.0000001, 0.0);
        let angle = angle_between(a, a);
        assert!(!angle.is_nan());
        assert_eq!(angle, 0.0);
        let opposite = angle_between(Point::new(1.0, 0.0), Point::new(-1.0, 0.0));
        assert!((opposite - PI).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert!(Point::new(0.0, 0.0).normalized().is_none());
        let unit = Point::new(3.0, 4.0).normalized().unwrap();
        assert!((unit.x - 0.6).abs() < 1e-6);
        assert!((unit.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_box_from_pixels() {
        let pixels = vec![
            PixelCoord::new(4, 7),
            PixelCoord::new(9, 2),
            PixelCoord::new(6, 5),
        ];
        let bbox = PixelBox::enclosing(&pixels).unwrap();
        assert_eq!(bbox, PixelBox::new(4, 2, 9, 7));
        assert_eq!(bbox.width(), 6);
        assert_eq!(bbox.height(), 6);
        assert_eq!(bbox.span_x(), 5);
        assert_eq!(bbox.center(), Point::new(6.5, 4.5));
        assert!(PixelBox::enclosing(&[]).is_none());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = PixelBox::new(10, 10, 20, 20);
        assert!(bbox.contains(Point::new(10.0, 20.0)));
        assert!(bbox.contains(Point::new(15.5, 12.0)));
        assert!(!bbox.contains(Point::new(20.5, 15.0)));
    }

    #[test]
    fn test_min_area_extent_axis_aligned_rectangle() {
        let pixels = rect_pixels(3, 5, 10, 4);
        let bbox = PixelBox::enclosing(&pixels).unwrap();
        let extent = min_area_extent(&pixels, &bbox, 36);
        assert_eq!(extent.angle, 0.0);
        assert_eq!(extent.length, 10.0);
        assert_eq!(extent.width, 4.0);
        assert!((extent.aspect_ratio() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_min_area_extent_finds_diagonal_stroke() {
        // A one-pixel-thick anti-diagonal line: its axis-aligned box is a 20x20
        // square but the 45 degree rotation collapses it to a thin strip.
        let pixels: Vec<PixelCoord> = (0..20).map(|i| PixelCoord::new(i, 19 - i)).collect();
        let bbox = PixelBox::enclosing(&pixels).unwrap();
        let extent = min_area_extent(&pixels, &bbox, 36);
        assert!(extent.area() < 400.0);
        assert!((extent.angle - PI / 4.0).abs() < 1e-5);
        assert!(extent.length > 5.0 * extent.width || extent.width > 5.0 * extent.length);
    }

    #[test]
    fn test_rotation_search_stops_below_quarter_turn() {
        let pixels: Vec<PixelCoord> = (0..20).map(|i| PixelCoord::new(i, 19 - i)).collect();
        let bbox = PixelBox::enclosing(&pixels).unwrap();

        // Two divisions leave no angle strictly between 0 and π/2.
        let extent = min_area_extent(&pixels, &bbox, 2);
        assert_eq!(extent.angle, 0.0);
        assert_eq!(extent.area(), 400.0);

        // Four divisions test π/4 only.
        let extent = min_area_extent(&pixels, &bbox, 4);
        assert!((extent.angle - PI / 4.0).abs() < 1e-5);
    }
}
