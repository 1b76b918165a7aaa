//! Detection configuration.
//!
//! Every tunable of the pipeline lives in [`DetectionConfig`] and its nested
//! sections. All sections deserialize from partial JSON documents: omitted
//! fields take the defaults listed in [`crate::core::constants`].

use super::errors::{ConfigError, ConfigValidator};
use super::parallel::ParallelPolicy;
use crate::core::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canny and gradient settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Lower hysteresis threshold for Canny.
    pub low_threshold: f32,
    /// Upper hysteresis threshold for Canny.
    pub high_threshold: f32,
    /// Sigma of the Gaussian blur applied before the Scharr gradients.
    pub blur_sigma: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            low_threshold: DEFAULT_CANNY_LOW_THRESHOLD,
            high_threshold: DEFAULT_CANNY_HIGH_THRESHOLD,
            blur_sigma: DEFAULT_GRADIENT_BLUR_SIGMA,
        }
    }
}

impl ConfigValidator for EdgeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_f32(self.low_threshold, "edges.low_threshold")?;
        self.validate_positive_f32(self.high_threshold, "edges.high_threshold")?;
        self.validate_positive_f32(self.blur_sigma, "edges.blur_sigma")?;
        if self.low_threshold > self.high_threshold {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "edges.low_threshold ({}) must not exceed edges.high_threshold ({})",
                    self.low_threshold, self.high_threshold
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Per-component geometry filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentFilterConfig {
    /// Components whose axis-aligned bounding box is taller than this many rows
    /// are dropped. The rotated extent is not used for this test.
    pub max_font_height: u32,
    /// Bound on the rotated bounding box length/width ratio (exclusive, both directions).
    pub max_aspect_ratio: f32,
    /// Number of increments per half turn when searching the minimal rotated box.
    /// Orientations in `[0, π/2)` are tested.
    pub rotation_divisions: u32,
    /// When set, drop components whose stroke width variance exceeds this multiple of the mean.
    pub max_variance_ratio: Option<f32>,
    /// Run the nested component pass.
    pub reject_nested: bool,
    /// How the nested component pass counts overlapping survivors.
    pub nested_rule: NestedRule,
    /// Overlap count at which a component counts as nested.
    pub max_nested_centers: usize,
}

/// Overlap test used by the nested component pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedRule {
    /// Count the other survivors whose bounding box holds this component's center.
    #[default]
    CenterInside,
    /// Count the other survivors whose center lies in this component's bounding box.
    /// Drops frames and blobs surrounding several characters.
    EnclosesCenters,
}

impl Default for ComponentFilterConfig {
    fn default() -> Self {
        Self {
            max_font_height: DEFAULT_MAX_FONT_HEIGHT,
            max_aspect_ratio: DEFAULT_MAX_ASPECT_RATIO,
            rotation_divisions: DEFAULT_ROTATION_DIVISIONS,
            max_variance_ratio: None,
            reject_nested: true,
            nested_rule: NestedRule::default(),
            max_nested_centers: DEFAULT_MAX_NESTED_CENTERS,
        }
    }
}

impl ComponentFilterConfig {
    /// Enable the stroke width variance test.
    pub fn with_max_variance_ratio(mut self, ratio: Option<f32>) -> Self {
        self.max_variance_ratio = ratio;
        self
    }

    /// Toggle the nested component pass.
    pub fn with_reject_nested(mut self, enabled: bool) -> Self {
        self.reject_nested = enabled;
        self
    }

    pub fn with_nested_rule(mut self, rule: NestedRule) -> Self {
        self.nested_rule = rule;
        self
    }
}

impl ConfigValidator for ComponentFilterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio_bound(self.max_aspect_ratio, "components.max_aspect_ratio")?;
        self.validate_positive_usize(
            self.rotation_divisions as usize,
            "components.rotation_divisions",
        )?;
        self.validate_positive_usize(
            self.max_nested_centers,
            "components.max_nested_centers",
        )?;
        if let Some(ratio) = self.max_variance_ratio {
            self.validate_positive_f32(ratio, "components.max_variance_ratio")?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Pairing and merging settings for chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Bound on the ratio of two components' median stroke widths.
    pub max_median_ratio: f32,
    /// Bound on the ratio of two components' widths and of their heights.
    pub max_dimension_ratio: f32,
    /// Upper bound on squared center distance over squared characteristic size.
    pub max_distance_ratio: f32,
    /// Maximum angle in radians between two chains' directions for a merge.
    pub merge_angle: f32,
    /// Chains with fewer distinct members are discarded.
    pub min_members: usize,
    /// When set, pairs whose mean colors differ by more than this (Euclidean, RGB) are skipped.
    pub max_color_distance: Option<f32>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_median_ratio: DEFAULT_MAX_MEDIAN_RATIO,
            max_dimension_ratio: DEFAULT_MAX_DIMENSION_RATIO,
            max_distance_ratio: DEFAULT_MAX_DISTANCE_RATIO,
            merge_angle: DEFAULT_MERGE_ANGLE,
            min_members: DEFAULT_MIN_CHAIN_MEMBERS,
            max_color_distance: None,
        }
    }
}

impl ConfigValidator for ChainConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio_bound(self.max_median_ratio, "chains.max_median_ratio")?;
        self.validate_ratio_bound(self.max_dimension_ratio, "chains.max_dimension_ratio")?;
        self.validate_positive_f32(self.max_distance_ratio, "chains.max_distance_ratio")?;
        self.validate_f32_range(
            self.merge_angle,
            0.0,
            std::f32::consts::PI,
            "chains.merge_angle",
        )?;
        self.validate_positive_usize(self.min_members, "chains.min_members")?;
        if let Some(distance) = self.max_color_distance {
            self.validate_positive_f32(distance, "chains.max_color_distance")?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings of the raster handed to the recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Blank border in pixels added around the rotated text region.
    pub border: u32,
    /// Upscale factor applied before erosion.
    pub upscale: f32,
    /// Erosion disk radius as a fraction of the upscaled height.
    pub erosion_fraction: f32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            border: DEFAULT_REGION_BORDER,
            upscale: DEFAULT_REGION_UPSCALE,
            erosion_fraction: DEFAULT_EROSION_FRACTION,
        }
    }
}

impl ConfigValidator for RegionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_f32(self.upscale, "region.upscale")?;
        self.validate_f32_range(self.erosion_fraction, 0.0, 0.5, "region.erosion_fraction")
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Categories of detail events emitted at `debug` level.
///
/// Stage summaries are always logged; these switch on the per-item events
/// (one per component, pair, chain or recognizer call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogCategories {
    /// Component acceptance and rejection.
    pub components: bool,
    /// Chain pairing and merging.
    pub chains: bool,
    /// Chain orientation and region rejection.
    pub orientation: bool,
    /// Recognizer input and reply.
    pub recognition: bool,
}

impl LogCategories {
    /// All categories enabled.
    pub fn all() -> Self {
        Self {
            components: true,
            chains: true,
            orientation: true,
            recognition: true,
        }
    }

    /// All categories disabled.
    pub fn none() -> Self {
        Self {
            components: false,
            chains: false,
            orientation: false,
            recognition: false,
        }
    }
}

impl Default for LogCategories {
    fn default() -> Self {
        Self::all()
    }
}

/// Full configuration of a [`crate::pipeline::TextDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Edge and gradient extraction.
    pub edges: EdgeConfig,
    /// Text is darker than its background.
    pub dark_on_light: bool,
    /// Rays longer than this many pixels are discarded.
    pub max_stroke_length: f32,
    /// Upper bound on the width ratio of two neighbouring pixels in one component.
    pub max_neighbor_width_ratio: f32,
    /// Rows at the top of the image in which components are ignored.
    pub top_border: u32,
    /// Rows at the bottom of the image in which components are ignored.
    pub bottom_border: u32,
    /// Chains whose shortest character is lower than this are not read.
    pub min_character_height: u32,
    /// Chains tilted by more than this many degrees are not read.
    pub max_angle: f32,
    /// Chains narrower than `image_width / max_img_width_to_text_ratio` are not read.
    pub max_img_width_to_text_ratio: f32,
    /// Component geometry filter.
    pub components: ComponentFilterConfig,
    /// Chain pairing and merging.
    pub chains: ChainConfig,
    /// Recognizer raster preparation.
    pub region: RegionConfig,
    /// Detail log categories.
    pub log: LogCategories,
    /// Parallelism thresholds.
    pub parallel: ParallelPolicy,
    /// Render debug images into the detection result.
    pub capture_debug: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            edges: EdgeConfig::default(),
            dark_on_light: true,
            max_stroke_length: DEFAULT_MAX_STROKE_LENGTH,
            max_neighbor_width_ratio: DEFAULT_MAX_NEIGHBOR_WIDTH_RATIO,
            top_border: 0,
            bottom_border: 0,
            min_character_height: DEFAULT_MIN_CHARACTER_HEIGHT,
            max_angle: DEFAULT_MAX_TEXT_ANGLE,
            max_img_width_to_text_ratio: DEFAULT_MAX_IMG_WIDTH_TO_TEXT_RATIO,
            components: ComponentFilterConfig::default(),
            chains: ChainConfig::default(),
            region: RegionConfig::default(),
            log: LogCategories::default(),
            parallel: ParallelPolicy::default(),
            capture_debug: false,
        }
    }
}

impl DetectionConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseFailed {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_dark_on_light(mut self, dark_on_light: bool) -> Self {
        self.dark_on_light = dark_on_light;
        self
    }

    pub fn with_max_stroke_length(mut self, length: f32) -> Self {
        self.max_stroke_length = length;
        self
    }

    pub fn with_borders(mut self, top: u32, bottom: u32) -> Self {
        self.top_border = top;
        self.bottom_border = bottom;
        self
    }

    pub fn with_min_character_height(mut self, height: u32) -> Self {
        self.min_character_height = height;
        self
    }

    pub fn with_max_angle(mut self, degrees: f32) -> Self {
        self.max_angle = degrees;
        self
    }

    pub fn with_max_img_width_to_text_ratio(mut self, ratio: f32) -> Self {
        self.max_img_width_to_text_ratio = ratio;
        self
    }

    pub fn with_components(mut self, components: ComponentFilterConfig) -> Self {
        self.components = components;
        self
    }

    pub fn with_chains(mut self, chains: ChainConfig) -> Self {
        self.chains = chains;
        self
    }

    pub fn with_log(mut self, log: LogCategories) -> Self {
        self.log = log;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_capture_debug(mut self, capture: bool) -> Self {
        self.capture_debug = capture;
        self
    }
}

impl ConfigValidator for DetectionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.edges.validate()?;
        self.validate_positive_f32(self.max_stroke_length, "max_stroke_length")?;
        self.validate_ratio_bound(self.max_neighbor_width_ratio, "max_neighbor_width_ratio")?;
        self.validate_f32_range(self.max_angle, 0.0, 90.0, "max_angle")?;
        self.validate_positive_f32(
            self.max_img_width_to_text_ratio,
            "max_img_width_to_text_ratio",
        )?;
        self.components.validate()?;
        self.chains.validate()?;
        self.region.validate()?;
        self.parallel.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DetectionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.dark_on_light);
        assert_eq!(config.edges.low_threshold, 175.0);
        assert_eq!(config.edges.high_threshold, 320.0);
        assert_eq!(config.min_character_height, 10);
        assert_eq!(config.max_angle, 45.0);
        assert!(config.components.max_variance_ratio.is_none());
        assert!(config.components.reject_nested);
        assert_eq!(config.components.nested_rule, NestedRule::CenterInside);
    }

    #[test]
    fn test_nested_rule_from_json() {
        let config = DetectionConfig::from_json_str(
            r#"{"components": {"nested_rule": "encloses_centers"}}"#,
        )
        .unwrap();
        assert_eq!(config.components.nested_rule, NestedRule::EnclosesCenters);
        assert!(DetectionConfig::from_json_str(r#"{"components": {"nested_rule": "inside"}}"#).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DetectionConfig::from_json_str(
            r#"{"dark_on_light": false, "components": {"reject_nested": false}}"#,
        )
        .unwrap();
        assert!(!config.dark_on_light);
        assert!(!config.components.reject_nested);
        assert_eq!(config.components.max_font_height, 300);
        assert_eq!(config.chains, ChainConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = DetectionConfig::default()
            .with_borders(12, 30)
            .with_max_angle(30.0)
            .with_log(LogCategories::none());
        let json = config.to_json_string().unwrap();
        assert_eq!(DetectionConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DetectionConfig::from_json_str(r#"{"max_angle": 120.0}"#).is_err());
        assert!(DetectionConfig::from_json_str(r#"{"max_stroke_length": 0.0}"#).is_err());
        assert!(
            DetectionConfig::from_json_str(r#"{"chains": {"max_median_ratio": 0.5}}"#).is_err()
        );
        assert!(
            DetectionConfig::from_json_str(
                r#"{"edges": {"low_threshold": 400.0, "high_threshold": 320.0}}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detect.json");
        std::fs::write(&path, r#"{"top_border": 40}"#).unwrap();

        let config = DetectionConfig::from_json_file(&path).unwrap();
        assert_eq!(config.top_border, 40);

        let missing = DetectionConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::ParseFailed { .. })));
    }
}
