//! The detection pipeline.
//!
//! This module combines the processing stages into a [`TextDetector`], runs it
//! over batches of images and collects per-run statistics.

pub mod batch;
pub mod detector;
pub mod stats;

pub use batch::{BatchReport, detect_batch, detect_paths};
pub use detector::{DetectionResult, TextDetector};
pub use stats::{BatchStats, DetectionStats};
