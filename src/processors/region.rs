//! Extraction of recognizer-ready rasters from chains.
//!
//! A chain is first screened on its size and tilt. Accepted chains are
//! binarized member by member, rotated so the text runs horizontally, cropped,
//! padded, upscaled and eroded.

use crate::core::config::RegionConfig;
use crate::processors::chains::Chain;
use crate::processors::component_filter::ComponentSet;
use crate::processors::geometry::{PixelBox, Point};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::geometric_transformations::{Interpolation, Projection, warp};
use imageproc::morphology::erode;

/// Extent and orientation of a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainGeometry {
    /// Union of the member bounding boxes.
    pub bbox: PixelBox,
    /// Smallest of the box height and the member heights, as row spans.
    pub min_height: u32,
    /// Text direction in degrees, in `[-90, 90]`.
    pub angle_degrees: f32,
}

impl ChainGeometry {
    /// Measures `chain`, or `None` if it has no members.
    pub fn measure(chain: &Chain, components: &ComponentSet) -> Option<Self> {
        let mut boxes = chain
            .members
            .iter()
            .filter_map(|&m| components.get(m))
            .map(|c| c.bbox);
        let first = boxes.next()?;
        let (bbox, member_min) = boxes.fold((first, first.span_y()), |(acc, h), b| {
            (acc.union(&b), h.min(b.span_y()))
        });

        // Flip into quadrants 1 and 4 so the angle is within [-90, 90].
        let direction = if chain.direction.x < 0.0 {
            -chain.direction
        } else {
            chain.direction
        };
        let angle_degrees = direction.y.atan2(direction.x).to_degrees();

        Some(Self {
            bbox,
            min_height: bbox.span_y().min(member_min),
            angle_degrees,
        })
    }
}

/// Reason a chain is not sent to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionRejection {
    TooNarrow { width: u32, min_width: f32 },
    TooShort { height: u32, min_height: u32 },
    TooSteep { angle: f32 },
    EmptyCrop,
}

/// Size and tilt limits applied before extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLimits {
    pub min_character_height: u32,
    /// Maximum tilt in degrees.
    pub max_angle: f32,
    pub max_img_width_to_text_ratio: f32,
}

impl RegionLimits {
    /// Checks a chain against the limits for an image `image_width` pixels wide.
    pub fn check(&self, geometry: &ChainGeometry, image_width: u32) -> Result<(), RegionRejection> {
        let min_width = image_width as f32 / self.max_img_width_to_text_ratio;
        let width = geometry.bbox.span_x();
        if (width as f32) < min_width {
            return Err(RegionRejection::TooNarrow { width, min_width });
        }
        if geometry.min_height < self.min_character_height {
            return Err(RegionRejection::TooShort {
                height: geometry.min_height,
                min_height: self.min_character_height,
            });
        }
        if geometry.angle_degrees.abs() > self.max_angle {
            return Err(RegionRejection::TooSteep {
                angle: geometry.angle_degrees,
            });
        }
        Ok(())
    }
}

/// Binarizes a patch with Otsu's threshold, foreground (dark) set to 255.
fn binarize_inverted(patch: &GrayImage) -> GrayImage {
    let level = otsu_level(patch);
    GrayImage::from_fn(patch.width(), patch.height(), |x, y| {
        if patch.get_pixel(x, y)[0] > level {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Rotation by `angle_degrees` about `center` that brings the text direction
/// onto the x axis, as (projection, point transform).
fn deskew(center: Point, angle_degrees: f32) -> (Projection, impl Fn(Point) -> Point) {
    let theta = angle_degrees.to_radians();
    let projection = Projection::translate(center.x, center.y)
        * Projection::rotate(-theta)
        * Projection::translate(-center.x, -center.y);

    let (sin, cos) = theta.sin_cos();
    let map_point = move |p: Point| {
        let (dx, dy) = (p.x - center.x, p.y - center.y);
        Point::new(
            cos * dx + sin * dy + center.x,
            -sin * dx + cos * dy + center.y,
        )
    };
    (projection, map_point)
}

/// Builds the raster submitted to the recognizer for one chain.
///
/// # Arguments
///
/// * `gray` - Grayscale input image.
/// * `chain` - The chain to extract.
/// * `components` - Component set the chain indexes into.
/// * `geometry` - Result of [`ChainGeometry::measure`] for the chain.
/// * `config` - Border, upscale and erosion settings.
///
/// # Returns
///
/// The prepared raster, or the reason none could be produced.
pub fn extract_patch(
    gray: &GrayImage,
    chain: &Chain,
    components: &ComponentSet,
    geometry: &ChainGeometry,
    config: &RegionConfig,
) -> Result<GrayImage, RegionRejection> {
    let (width, height) = gray.dimensions();
    let mut composite = GrayImage::new(width, height);

    let members: Vec<PixelBox> = chain
        .members
        .iter()
        .filter_map(|&m| components.get(m))
        .map(|c| c.bbox)
        .collect();

    for bbox in &members {
        let (w, h) = (bbox.span_x(), bbox.span_y());
        if w == 0 || h == 0 {
            continue;
        }
        let patch = imageops::crop_imm(gray, bbox.min_x, bbox.min_y, w, h).to_image();
        let binary = binarize_inverted(&patch);
        imageops::replace(&mut composite, &binary, bbox.min_x as i64, bbox.min_y as i64);
    }

    let bbox = geometry.bbox;
    let center = Point::new(
        (bbox.min_x + bbox.max_x) as f32 / 2.0,
        (bbox.min_y + bbox.max_y) as f32 / 2.0,
    );
    let (projection, map_point) = deskew(center, geometry.angle_degrees);
    let rotated = warp(&composite, &projection, Interpolation::Bilinear, Luma([0]));

    let corners: Vec<(i64, i64)> = members
        .iter()
        .flat_map(|b| b.corners())
        .map(|c| {
            let p = map_point(c);
            (p.x.round() as i64, p.y.round() as i64)
        })
        .collect();
    let clamp_x = |v: i64| v.clamp(0, width as i64 - 1);
    let clamp_y = |v: i64| v.clamp(0, height as i64 - 1);
    let min_x = clamp_x(corners.iter().map(|c| c.0).min().ok_or(RegionRejection::EmptyCrop)?);
    let max_x = clamp_x(corners.iter().map(|c| c.0).max().ok_or(RegionRejection::EmptyCrop)?);
    let min_y = clamp_y(corners.iter().map(|c| c.1).min().ok_or(RegionRejection::EmptyCrop)?);
    let max_y = clamp_y(corners.iter().map(|c| c.1).max().ok_or(RegionRejection::EmptyCrop)?);
    let (roi_w, roi_h) = ((max_x - min_x) as u32, (max_y - min_y) as u32);
    if roi_w == 0 || roi_h == 0 {
        return Err(RegionRejection::EmptyCrop);
    }

    let text = imageops::crop_imm(&rotated, min_x as u32, min_y as u32, roi_w, roi_h).to_image();
    let mut padded = GrayImage::new(roi_w + 2 * config.border, roi_h + 2 * config.border);
    imageops::replace(&mut padded, &text, config.border as i64, config.border as i64);

    let scaled_w = ((padded.width() as f32 * config.upscale).round() as u32).max(1);
    let scaled_h = ((padded.height() as f32 * config.upscale).round() as u32).max(1);
    let scaled = imageops::resize(&padded, scaled_w, scaled_h, FilterType::Triangle);

    let radius = (config.erosion_fraction * scaled.height() as f32).floor();
    if radius >= 1.0 {
        Ok(erode(&scaled, Norm::L2, radius.min(u8::MAX as f32) as u8))
    } else {
        Ok(scaled)
    }
}
