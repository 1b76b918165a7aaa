//! Stroke width transform.
//!
//! Every edge pixel shoots a ray along its gradient, into the stroke. When the ray
//! meets another edge pixel whose gradient points roughly the opposite way, all
//! pixels on the ray are assigned the ray length as a candidate stroke width.

use crate::core::config::ParallelPolicy;
use crate::core::constants::RAY_STEP;
use crate::core::errors::{DimensionMismatch, OCRError, OcrResult, ProcessingStage};
use crate::processors::edges::GradientField;
use crate::processors::geometry::{PixelCoord, Point, StrokeSample, angle_between};
use image::GrayImage;
use rayon::prelude::*;
use std::f32::consts::FRAC_PI_2;

/// Per-pixel stroke width, row-major. Unassigned pixels hold [`StrokeWidthMap::UNSET`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeWidthMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl StrokeWidthMap {
    /// Marker for pixels that no ray has reached.
    pub const UNSET: f32 = -1.0;

    /// Creates a map with every pixel unset.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![Self::UNSET; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Raw value at a pixel, including the unset marker. `None` outside the map.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Stroke width at a pixel, `None` if unset or outside the map.
    pub fn width_at(&self, x: u32, y: u32) -> Option<f32> {
        self.get(x, y).filter(|&w| w > 0.0)
    }

    /// Lowers the value at a pixel to `value` if it is unset or larger.
    ///
    /// Returns true when the stored value changed.
    pub fn set_min(&mut self, x: u32, y: u32, value: f32) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let current = self.data[i];
        if current == Self::UNSET || value < current {
            self.data[i] = value;
            true
        } else {
            false
        }
    }

    /// Number of pixels with an assigned width.
    pub fn set_count(&self) -> usize {
        self.data.iter().filter(|&&w| w > 0.0).count()
    }

    /// All assigned pixels in row-major order.
    pub fn samples(&self) -> impl Iterator<Item = StrokeSample> + '_ {
        let width = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(move |(i, &w)| StrokeSample {
                coord: PixelCoord::new((i % width) as u32, (i / width) as u32),
                width: w,
            })
    }

    /// Smallest and largest assigned width.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.samples().fold(None, |range, s| match range {
            None => Some((s.width, s.width)),
            Some((lo, hi)) => Some((lo.min(s.width), hi.max(s.width))),
        })
    }
}

/// An accepted ray between two opposing edge pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    /// Starting edge pixel.
    pub p: PixelCoord,
    /// Terminating edge pixel.
    pub q: PixelCoord,
    /// Every pixel cell entered, `p` first and `q` last.
    pub points: Vec<PixelCoord>,
    /// Euclidean distance from `p` to `q`.
    pub width: f32,
}

/// Ray caster producing a [`StrokeWidthMap`].
#[derive(Debug, Clone)]
pub struct StrokeWidthTransform {
    dark_on_light: bool,
    max_stroke_length: f32,
}

impl StrokeWidthTransform {
    /// Creates a transform.
    ///
    /// # Arguments
    ///
    /// * `dark_on_light` - Text is darker than the background; gradients are negated.
    /// * `max_stroke_length` - Rays longer than this are discarded.
    pub fn new(dark_on_light: bool, max_stroke_length: f32) -> Self {
        Self {
            dark_on_light,
            max_stroke_length,
        }
    }

    /// Casts a ray from every edge pixel and records accepted widths.
    ///
    /// Edge pixels are visited in row-major order. Rays may be cast in parallel
    /// above the policy threshold; the map updates are applied afterwards in the
    /// same order, so the result does not depend on the thread count.
    ///
    /// # Errors
    ///
    /// Returns a `StrokeWidth` processing error wrapping [`DimensionMismatch`]
    /// when the edge map and gradient field differ in size.
    pub fn apply(
        &self,
        edges: &GrayImage,
        gradients: &GradientField,
        policy: &ParallelPolicy,
    ) -> OcrResult<(StrokeWidthMap, Vec<Ray>)> {
        let (width, height) = edges.dimensions();
        let field = (gradients.width(), gradients.height());
        if field != (width, height) {
            return Err(OCRError::processing_error(
                ProcessingStage::StrokeWidth,
                "edge map and gradient field",
                DimensionMismatch {
                    expected: (width, height),
                    actual: field,
                },
            ));
        }

        let edge_pixels: Vec<PixelCoord> = edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 0)
            .map(|(x, y, _)| PixelCoord::new(x, y))
            .collect();

        let rays: Vec<Ray> = if policy.parallel_rays(edge_pixels.len()) {
            edge_pixels
                .par_iter()
                .filter_map(|&p| self.cast_ray(edges, gradients, p))
                .collect()
        } else {
            edge_pixels
                .iter()
                .filter_map(|&p| self.cast_ray(edges, gradients, p))
                .collect()
        };

        let mut map = StrokeWidthMap::new(width, height);
        for ray in &rays {
            for point in &ray.points {
                map.set_min(point.x, point.y, ray.width);
            }
        }
        Ok((map, rays))
    }

    /// Marches from the center of `p` along its stroke direction until another
    /// edge pixel is reached or the ray can no longer be accepted.
    fn cast_ray(&self, edges: &GrayImage, gradients: &GradientField, p: PixelCoord) -> Option<Ray> {
        let direction = gradients.stroke_direction(p.x, p.y, self.dark_on_light)?;
        let (width, height) = edges.dimensions();

        let start = Point::new(p.x as f32 + 0.5, p.y as f32 + 0.5);
        let mut current = p;
        let mut points = vec![p];
        // Once the travelled distance exceeds this, any hit would be too long.
        let max_travel = self.max_stroke_length + 1.0;

        let mut steps: u32 = 0;
        loop {
            steps += 1;
            let travelled = RAY_STEP * steps as f32;
            if travelled > max_travel {
                return None;
            }
            let position = Point::new(
                start.x + direction.x * travelled,
                start.y + direction.y * travelled,
            );

            let (fx, fy) = (position.x.floor(), position.y.floor());
            if fx < 0.0 || fy < 0.0 || fx >= width as f32 || fy >= height as f32 {
                return None;
            }
            let cell = PixelCoord::new(fx as u32, fy as u32);
            if cell == current {
                continue;
            }
            current = cell;
            points.push(cell);

            if edges.get_pixel(cell.x, cell.y)[0] == 0 {
                continue;
            }

            let opposite = gradients.stroke_direction(cell.x, cell.y, self.dark_on_light)?;
            if angle_between(direction, -opposite) >= FRAC_PI_2 {
                return None;
            }
            let length = p.distance(cell);
            if length > self.max_stroke_length {
                return None;
            }
            return Some(Ray {
                p,
                q: cell,
                points,
                width: length,
            });
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Edge ring and outward gradients of dark squares on a light background,
    /// corners excluded from the edge map.
    pub(crate) fn square_rasters(
        width: u32,
        height: u32,
        squares: &[(u32, u32, u32)],
    ) -> (GrayImage, GradientField) {
        let mut edges = GrayImage::new(width, height);
        let mut gx = vec![0.0f32; (width * height) as usize];
        let mut gy = vec![0.0f32; (width * height) as usize];
        for &(x0, y0, size) in squares {
            let (x1, y1) = (x0 + size - 1, y0 + size - 1);
            for i in 1..size - 1 {
                for (x, y, g) in [
                    (x0, y0 + i, (-1.0, 0.0)),
                    (x1, y0 + i, (1.0, 0.0)),
                    (x0 + i, y0, (0.0, -1.0)),
                    (x0 + i, y1, (0.0, 1.0)),
                ] {
                    edges.put_pixel(x, y, image::Luma([255]));
                    let idx = (y * width + x) as usize;
                    gx[idx] = g.0;
                    gy[idx] = g.1;
                }
            }
        }
        let field = GradientField::from_components(width, height, gx, gy).unwrap();
        (edges, field)
    }

    #[test]
    fn test_set_min_never_increases() {
        let mut map = StrokeWidthMap::new(3, 3);
        assert!(map.set_min(1, 1, 5.0));
        assert!(!map.set_min(1, 1, 7.0));
        assert!(map.set_min(1, 1, 4.0));
        assert_eq!(map.get(1, 1), Some(4.0));
        assert_eq!(map.width_at(0, 0), None);
        assert_eq!(map.get(3, 0), None);
        assert!(!map.set_min(3, 0, 1.0));
    }

    #[test]
    fn test_square_gets_uniform_width() {
        let (edges, gradients) = square_rasters(20, 20, &[(5, 5, 8)]);
        let swt = StrokeWidthTransform::new(true, 70.0);
        let (map, rays) = swt.apply(&edges, &gradients, &ParallelPolicy::default()).unwrap();

        // 6 rays from each side of the square.
        assert_eq!(rays.len(), 24);
        assert!(rays.iter().all(|r| r.width == 7.0 && r.points.len() == 8));
        assert_eq!(map.set_count(), 64 - 4);
        assert_eq!(map.width_at(8, 8), Some(7.0));
        assert_eq!(map.width_at(5, 5), None);
        assert_eq!(map.width_at(2, 2), None);
    }

    #[test]
    fn test_wrong_polarity_finds_nothing() {
        let (edges, gradients) = square_rasters(20, 20, &[(5, 5, 8)]);
        let swt = StrokeWidthTransform::new(false, 70.0);
        let (map, rays) = swt.apply(&edges, &gradients, &ParallelPolicy::default()).unwrap();
        assert!(rays.is_empty());
        assert_eq!(map.set_count(), 0);
    }

    #[test]
    fn test_long_rays_discarded() {
        let (edges, gradients) = square_rasters(20, 20, &[(5, 5, 8)]);
        let swt = StrokeWidthTransform::new(true, 6.5);
        let (map, rays) = swt.apply(&edges, &gradients, &ParallelPolicy::default()).unwrap();
        assert!(rays.is_empty());
        assert_eq!(map.set_count(), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (edges, gradients) = square_rasters(40, 20, &[(2, 2, 8), (15, 4, 10), (28, 3, 6)]);
        let swt = StrokeWidthTransform::new(true, 70.0);
        let sequential = swt.apply(&edges, &gradients, &ParallelPolicy::default()).unwrap();
        let parallel_policy = ParallelPolicy::default().with_edge_pixel_threshold(0);
        let parallel = swt.apply(&edges, &gradients, &parallel_policy).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_mismatched_rasters_rejected() {
        let edges = GrayImage::new(10, 10);
        let gradients = GradientField::from_components(9, 10, vec![0.0; 90], vec![0.0; 90]).unwrap();
        let swt = StrokeWidthTransform::new(true, 70.0);
        let err = swt
            .apply(&edges, &gradients, &ParallelPolicy::default())
            .unwrap_err();
        assert_eq!(err.stage(), Some(ProcessingStage::StrokeWidth));
    }
}
