//! The text detector.
//!
//! [`TextDetector`] runs every stage on one image and returns the numbers read
//! by its recognizer. The detector holds no per-image state, so one instance can
//! serve many threads.

use crate::core::config::{ConfigValidator, DetectionConfig};
use crate::core::errors::OcrResult;
use crate::pipeline::stats::DetectionStats;
use crate::processors::{
    ChainBuilder, ChainGeometry, ComponentFilter, PreparedImage, RegionLimits,
    StrokeWidthTransform, component_colors, extract_patch, find_components, prepare,
    refine_with_ray_medians,
};
use crate::recognition::{TextRecognizer, accept_reading};
use crate::utils::image::to_rgb8_checked;
use crate::utils::visualization::{self, DebugArtifacts};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Output of one detection run.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Accepted readings in chain order. May contain duplicates.
    pub texts: Vec<String>,
    /// Per-stage counters.
    pub stats: DetectionStats,
    /// Debug renderings, present when `capture_debug` is set.
    pub debug: Option<DebugArtifacts>,
}

impl DetectionResult {
    /// Readings parsed as numbers, sorted and deduplicated.
    pub fn unique_numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = self.texts.iter().filter_map(|t| t.parse().ok()).collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Stroke width transform detector for race-bib numbers.
#[derive(Clone)]
pub struct TextDetector {
    config: DetectionConfig,
    recognizer: Arc<dyn TextRecognizer>,
}

impl std::fmt::Debug for TextDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TextDetector {
    /// Creates a detector.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate.
    pub fn new(config: DetectionConfig, recognizer: impl TextRecognizer + 'static) -> OcrResult<Self> {
        Self::with_shared_recognizer(config, Arc::new(recognizer))
    }

    /// Creates a detector around a recognizer shared with other owners.
    pub fn with_shared_recognizer(
        config: DetectionConfig,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> OcrResult<Self> {
        config.validate()?;
        let settings = recognizer.settings();
        info!(
            page_mode = ?settings.page_mode,
            dictionaries_disabled = settings.disabled_dictionaries.len(),
            dark_on_light = config.dark_on_light,
            "text detector ready"
        );
        Ok(Self { config, recognizer })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detects and reads numbers in an 8-bit RGB image.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty image. Failures of individual
    /// candidates, including recognizer errors, are logged and skipped.
    pub fn detect(&self, image: &RgbImage) -> OcrResult<DetectionResult> {
        let started = Instant::now();
        let prepared = prepare(image, &self.config.edges)?;
        self.run(&prepared, started)
    }

    /// Like [`TextDetector::detect`] for a decoded image of any 8-bit format.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for images with more than 8 bits per channel.
    pub fn detect_dynamic(&self, image: &DynamicImage) -> OcrResult<DetectionResult> {
        let rgb = to_rgb8_checked(image)?;
        self.detect(&rgb)
    }

    /// Runs the detector on rasters prepared by the caller, skipping edge and
    /// gradient extraction.
    pub fn detect_prepared(&self, prepared: &PreparedImage) -> OcrResult<DetectionResult> {
        self.run(prepared, Instant::now())
    }

    fn run(&self, prepared: &PreparedImage, started: Instant) -> OcrResult<DetectionResult> {
        let config = &self.config;
        let log = config.log;
        let mut stats = DetectionStats {
            width: prepared.width(),
            height: prepared.height(),
            edge_pixels: prepared.edge_count(),
            ..DetectionStats::default()
        };

        let swt = StrokeWidthTransform::new(config.dark_on_light, config.max_stroke_length);
        let (mut map, rays) = swt.apply(&prepared.edges, &prepared.gradients, &config.parallel)?;
        refine_with_ray_medians(&mut map, &rays);
        stats.rays = rays.len();
        stats.stroke_pixels = map.set_count();
        debug!(rays = stats.rays, pixels = stats.stroke_pixels, "stroke widths computed");

        let raw = find_components(&map, config.max_neighbor_width_ratio);
        stats.raw_components = raw.len();
        let components = ComponentFilter::new(&config.components, prepared.height())
            .with_borders(config.top_border, config.bottom_border)
            .with_log(log)
            .filter(raw, &map);
        stats.valid_components = components.len();
        debug!(
            raw = stats.raw_components,
            valid = stats.valid_components,
            "components filtered"
        );

        let colors = component_colors(&components, &prepared.color);
        let (chains, report) = ChainBuilder::new(&config.chains)
            .with_log(log)
            .build(&components, &colors);
        stats.eligible_pairs = report.eligible_pairs;
        stats.merge_passes = report.passes;
        stats.chains = chains.len();

        let limits = RegionLimits {
            min_character_height: config.min_character_height,
            max_angle: config.max_angle,
            max_img_width_to_text_ratio: config.max_img_width_to_text_ratio,
        };

        let mut texts = Vec::new();
        for (index, chain) in chains.iter().enumerate() {
            let Some(geometry) = ChainGeometry::measure(chain, &components) else {
                continue;
            };
            if log.orientation {
                debug!(
                    chain = index,
                    angle = geometry.angle_degrees,
                    bbox = ?geometry.bbox,
                    "chain orientation"
                );
            }

            let patch = limits
                .check(&geometry, prepared.width())
                .and_then(|_| {
                    extract_patch(&prepared.gray, chain, &components, &geometry, &config.region)
                });
            let patch = match patch {
                Ok(patch) => patch,
                Err(reason) => {
                    stats.rejected_regions += 1;
                    if log.orientation {
                        debug!(chain = index, ?reason, "chain region rejected");
                    }
                    continue;
                }
            };

            stats.recognizer_calls += 1;
            let raw_text = match self.recognizer.recognize(&patch) {
                Ok(text) => text,
                Err(err) => {
                    stats.recognizer_errors += 1;
                    warn!(chain = index, error = %err, "recognizer failed");
                    continue;
                }
            };

            match accept_reading(&raw_text, chain.members.len()) {
                Ok(text) => {
                    if log.recognition {
                        debug!(chain = index, text = %text, "reading accepted");
                    }
                    texts.push(text);
                }
                Err(reason) => {
                    if log.recognition {
                        debug!(chain = index, raw = %raw_text.trim(), ?reason, "reading rejected");
                    }
                }
            }
        }
        stats.accepted = texts.len();

        let debug_images = config
            .capture_debug
            .then(|| visualization::capture(&map, &components, &chains));

        stats.elapsed = started.elapsed();
        debug!(
            chains = stats.chains,
            accepted = stats.accepted,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "detection finished"
        );

        Ok(DetectionResult {
            texts,
            stats,
            debug: debug_images,
        })
    }
}
