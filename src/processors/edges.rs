//! Edge map and gradient field extraction.
//!
//! The stroke width transform consumes three rasters of identical size: a binary
//! Canny edge map and the horizontal and vertical Scharr gradients of the
//! smoothed grayscale image.

use crate::core::config::EdgeConfig;
use crate::core::errors::{OCRError, OcrResult};
use crate::processors::geometry::Point;
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_scharr, vertical_scharr};
use tracing::debug;

/// Horizontal and vertical image gradients, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    width: u32,
    height: u32,
    gx: Vec<f32>,
    gy: Vec<f32>,
}

impl GradientField {
    /// Builds a gradient field from raw row-major components.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when either buffer does not hold `width * height` values.
    pub fn from_components(width: u32, height: u32, gx: Vec<f32>, gy: Vec<f32>) -> OcrResult<Self> {
        let expected = width as usize * height as usize;
        if gx.len() != expected || gy.len() != expected {
            return Err(OCRError::invalid_input(format!(
                "gradient buffers hold {} and {} values, expected {} for {}x{}",
                gx.len(),
                gy.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            gx,
            gy,
        })
    }

    /// Computes Scharr gradients of `gray`.
    pub fn scharr(gray: &GrayImage) -> Self {
        let to_f32 = |image: ImageBuffer<Luma<i16>, Vec<i16>>| -> Vec<f32> {
            image.pixels().map(|p| p[0] as f32).collect()
        };
        Self {
            width: gray.width(),
            height: gray.height(),
            gx: to_f32(horizontal_scharr(gray)),
            gy: to_f32(vertical_scharr(gray)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw gradient at a pixel, `None` outside the field.
    pub fn get(&self, x: u32, y: u32) -> Option<Point> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        Some(Point::new(self.gx[idx], self.gy[idx]))
    }

    /// Unit gradient at a pixel, pointing into the stroke.
    ///
    /// For dark text on a light background the gradient points away from the
    /// stroke, so it is negated. Returns `None` for a zero gradient.
    pub fn stroke_direction(&self, x: u32, y: u32, dark_on_light: bool) -> Option<Point> {
        let unit = self.get(x, y)?.normalized()?;
        Some(if dark_on_light { -unit } else { unit })
    }
}

/// All rasters the detection stages read.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Color input, used for per-component color averages.
    pub color: RgbImage,
    /// Grayscale input, used for patch binarization.
    pub gray: GrayImage,
    /// Binary edge map; any nonzero value is an edge.
    pub edges: GrayImage,
    /// Gradient field of the smoothed grayscale image.
    pub gradients: GradientField,
}

impl PreparedImage {
    /// Assembles prepared rasters computed elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the rasters differ in size or are empty.
    pub fn from_parts(
        color: RgbImage,
        edges: GrayImage,
        gradients: GradientField,
    ) -> OcrResult<Self> {
        let dims = color.dimensions();
        if dims.0 == 0 || dims.1 == 0 {
            return Err(OCRError::invalid_input("image has zero width or height"));
        }
        if edges.dimensions() != dims || (gradients.width(), gradients.height()) != dims {
            return Err(OCRError::invalid_input(format!(
                "raster sizes differ: color {:?}, edges {:?}, gradients {:?}",
                dims,
                edges.dimensions(),
                (gradients.width(), gradients.height())
            )));
        }
        let gray = image::imageops::grayscale(&color);
        Ok(Self {
            color,
            gray,
            edges,
            gradients,
        })
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    /// Number of edge pixels.
    pub fn edge_count(&self) -> usize {
        self.edges.pixels().filter(|p| p[0] > 0).count()
    }
}

/// Converts a color image to grayscale, runs Canny and computes the gradient field.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty image.
pub fn prepare(image: &RgbImage, config: &EdgeConfig) -> OcrResult<PreparedImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OCRError::invalid_input("image has zero width or height"));
    }

    let gray = image::imageops::grayscale(image);
    let edges = canny(&gray, config.low_threshold, config.high_threshold);
    let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
    let gradients = GradientField::scharr(&blurred);

    let prepared = PreparedImage {
        color: image.clone(),
        gray,
        edges,
        gradients,
    };
    debug!(
        width,
        height,
        edge_pixels = prepared.edge_count(),
        "prepared edges and gradients"
    );
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_field_rejects_short_buffers() {
        let result = GradientField::from_components(4, 4, vec![0.0; 16], vec![0.0; 15]);
        assert!(matches!(result, Err(OCRError::InvalidInput { .. })));
    }

    #[test]
    fn test_stroke_direction_negated_for_dark_text() {
        let mut gx = vec![0.0; 4];
        gx[1] = 3.0;
        let field = GradientField::from_components(2, 2, gx, vec![0.0; 4]).unwrap();

        assert_eq!(field.stroke_direction(1, 0, true), Some(Point::new(-1.0, 0.0)));
        assert_eq!(field.stroke_direction(1, 0, false), Some(Point::new(1.0, 0.0)));
        assert_eq!(field.stroke_direction(0, 0, true), None);
        assert_eq!(field.stroke_direction(5, 0, true), None);
    }

    #[test]
    fn test_scharr_points_from_dark_to_light() {
        let gray = GrayImage::from_fn(12, 12, |x, _| if x < 6 { Luma([0]) } else { Luma([255]) });
        let field = GradientField::scharr(&gray);
        let g = field.get(6, 6).unwrap();
        assert!(g.x > 0.0);
        assert_eq!(g.y, 0.0);
    }

    #[test]
    fn test_prepare_blank_image_has_no_edges() {
        let image = RgbImage::from_pixel(32, 24, image::Rgb([200, 200, 200]));
        let prepared = prepare(&image, &EdgeConfig::default()).unwrap();
        assert_eq!(prepared.edge_count(), 0);
        assert_eq!(prepared.gray.dimensions(), (32, 24));
    }

    #[test]
    fn test_prepare_rejects_empty_image() {
        let image = RgbImage::new(0, 10);
        assert!(prepare(&image, &EdgeConfig::default()).is_err());
    }

    #[test]
    fn test_from_parts_rejects_mismatched_sizes() {
        let color = RgbImage::new(8, 8);
        let edges = GrayImage::new(8, 7);
        let gradients = GradientField::from_components(8, 8, vec![0.0; 64], vec![0.0; 64]).unwrap();
        assert!(PreparedImage::from_parts(color, edges, gradients).is_err());
    }
}
