//! Default values and fixed parameters of the detector.

/// Default lower Canny hysteresis threshold.
pub const DEFAULT_CANNY_LOW_THRESHOLD: f32 = 175.0;

/// Default upper Canny hysteresis threshold.
pub const DEFAULT_CANNY_HIGH_THRESHOLD: f32 = 320.0;

/// Default Gaussian sigma applied before computing the Scharr gradients.
pub const DEFAULT_GRADIENT_BLUR_SIGMA: f32 = 1.0;

/// Distance in pixels a ray advances per step.
pub const RAY_STEP: f32 = 0.05;

/// Default longest accepted ray.
pub const DEFAULT_MAX_STROKE_LENGTH: f32 = 70.0;

/// Default bound on the width ratio of two neighbouring pixels of one component.
pub const DEFAULT_MAX_NEIGHBOR_WIDTH_RATIO: f32 = 3.0;

/// Default tallest accepted component, in pixels.
pub const DEFAULT_MAX_FONT_HEIGHT: u32 = 300;

/// Default bound on a component's rotated aspect ratio.
pub const DEFAULT_MAX_ASPECT_RATIO: f32 = 2.0;

/// Default number of increments per half turn for the rotated box search (5 degrees).
pub const DEFAULT_ROTATION_DIVISIONS: u32 = 36;

/// Default number of contained centers marking a component as nested.
pub const DEFAULT_MAX_NESTED_CENTERS: usize = 2;

/// Default bound on the median stroke width ratio of paired components.
pub const DEFAULT_MAX_MEDIAN_RATIO: f32 = 3.0;

/// Default bound on the width and height ratios of paired components.
pub const DEFAULT_MAX_DIMENSION_RATIO: f32 = 2.0;

/// Default bound on squared center distance over squared characteristic size.
pub const DEFAULT_MAX_DISTANCE_RATIO: f32 = 1.6;

/// Default merge angle tolerance (30 degrees).
pub const DEFAULT_MERGE_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

/// Default minimum number of distinct components in a reported chain.
pub const DEFAULT_MIN_CHAIN_MEMBERS: usize = 3;

/// Default minimum character height for recognition.
pub const DEFAULT_MIN_CHARACTER_HEIGHT: u32 = 10;

/// Default maximum text tilt in degrees.
pub const DEFAULT_MAX_TEXT_ANGLE: f32 = 45.0;

/// Default image width to text width ratio.
pub const DEFAULT_MAX_IMG_WIDTH_TO_TEXT_RATIO: f32 = 50.0;

/// Default blank border around the recognizer raster.
pub const DEFAULT_REGION_BORDER: u32 = 3;

/// Default upscale factor of the recognizer raster.
pub const DEFAULT_REGION_UPSCALE: f32 = 3.0;

/// Default erosion radius as a fraction of the upscaled raster height.
pub const DEFAULT_EROSION_FRACTION: f32 = 0.05;
