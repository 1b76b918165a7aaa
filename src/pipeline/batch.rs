//! Running one detector over many images.

use crate::core::errors::{OCRError, OcrResult, ProcessingStage};
use crate::pipeline::detector::{DetectionResult, TextDetector};
use crate::pipeline::stats::BatchStats;
use crate::utils::image::load_image;
use image::RgbImage;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Per-image outcomes in input order, with aggregate statistics.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<OcrResult<DetectionResult>>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Numbers found across all successful images, sorted and deduplicated.
    pub fn all_numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = self
            .results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .flat_map(DetectionResult::unique_numbers)
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

fn collect_report(results: Vec<OcrResult<DetectionResult>>) -> BatchReport {
    let mut stats = BatchStats::default();
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(detection) => stats.record(Some(&detection.stats)),
            Err(err) => {
                warn!(image = index, error = %err, "image failed");
                stats.record(None);
            }
        }
    }
    BatchReport { results, stats }
}

fn run_all<T, F>(detector: &TextDetector, inputs: &[T], work: F) -> OcrResult<BatchReport>
where
    T: Sync,
    F: Fn(&T) -> OcrResult<DetectionResult> + Sync,
{
    let policy = &detector.config().parallel;
    if !policy.parallel_images(inputs.len()) {
        debug!("Using sequential processing for {} images", inputs.len());
        return Ok(collect_report(inputs.iter().map(&work).collect()));
    }

    debug!("Using parallel processing for {} images", inputs.len());
    let results = match policy.max_threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    OCRError::processing_error(
                        ProcessingStage::BatchProcessing,
                        "building thread pool",
                        e,
                    )
                })?;
            pool.install(|| inputs.par_iter().map(&work).collect())
        }
        None => inputs.par_iter().map(&work).collect(),
    };
    Ok(collect_report(results))
}

/// Runs the detector on every image. A failing image does not stop the batch.
///
/// # Errors
///
/// Returns a `BatchProcessing` error only when the requested thread pool
/// cannot be built.
pub fn detect_batch(detector: &TextDetector, images: &[RgbImage]) -> OcrResult<BatchReport> {
    run_all(detector, images, |image| detector.detect(image))
}

/// Loads and processes image files. Unreadable files are reported as
/// `ImageLoad` failures in the matching result slot.
pub fn detect_paths<P>(detector: &TextDetector, paths: &[P]) -> OcrResult<BatchReport>
where
    P: AsRef<Path> + Sync,
{
    run_all(detector, paths, |path| {
        let image = load_image(path.as_ref())?;
        detector.detect(&image)
    })
}
