//! Detection stages.
//!
//! Each module implements one step of the stroke width text detector:
//!
//! - [`edges`]: grayscale conversion, Canny edges and Scharr gradients
//! - [`stroke_width`]: ray casting into a per-pixel stroke width map
//! - [`median_filter`]: clamping each ray to its median width
//! - [`components`]: connected components of consistent width
//! - [`component_filter`]: geometric filtering of character candidates
//! - [`chains`]: pairing and merging candidates into text lines
//! - [`region`]: deskewed, binarized rasters for the recognizer

pub mod chains;
pub mod component_filter;
pub mod components;
pub mod edges;
pub mod geometry;
pub mod median_filter;
pub mod region;
pub mod stroke_width;

pub use chains::{Chain, ChainBuilder, ChainReport, component_colors};
pub use component_filter::{ComponentFilter, ComponentSet, ComponentStats, ValidComponent};
pub use components::{Component, PixelGraph, find_components};
pub use edges::{GradientField, PreparedImage, prepare};
pub use geometry::{
    PixelBox, PixelCoord, Point, RotatedExtent, StrokeSample, angle_between, min_area_extent,
    ratio_within,
};
pub use median_filter::refine_with_ray_medians;
pub use region::{ChainGeometry, RegionLimits, RegionRejection, extract_patch};
pub use stroke_width::{Ray, StrokeWidthMap, StrokeWidthTransform};
