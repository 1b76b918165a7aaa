//! Shared parallel processing configuration types.

use super::errors::{ConfigError, ConfigValidator};
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing behavior across the detector.
///
/// Work is split at two levels: whole images in a batch, and ray casting inside a
/// single image. Both fall back to sequential execution below their thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for batch processing.
    /// If None, rayon will use the global thread pool (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Number of images processed sequentially (<= this uses sequential).
    /// Default: 1 (single images run inline, larger batches fan out)
    #[serde(default = "ParallelPolicy::default_image_threshold")]
    pub image_threshold: usize,

    /// Number of edge pixels for which rays are cast sequentially (<= this uses sequential).
    /// Default: 4000
    #[serde(default = "ParallelPolicy::default_edge_pixel_threshold")]
    pub edge_pixel_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the image processing threshold.
    pub fn with_image_threshold(mut self, threshold: usize) -> Self {
        self.image_threshold = threshold;
        self
    }

    /// Set the edge pixel threshold for parallel ray casting.
    pub fn with_edge_pixel_threshold(mut self, threshold: usize) -> Self {
        self.edge_pixel_threshold = threshold;
        self
    }

    /// Returns true when a batch of `image_count` images should be spread over threads.
    pub fn parallel_images(&self, image_count: usize) -> bool {
        image_count > self.image_threshold
    }

    /// Returns true when rays from `edge_pixels` edge pixels should be cast in parallel.
    pub fn parallel_rays(&self, edge_pixels: usize) -> bool {
        edge_pixels > self.edge_pixel_threshold
    }

    fn default_image_threshold() -> usize {
        1
    }

    fn default_edge_pixel_threshold() -> usize {
        4_000
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            image_threshold: Self::default_image_threshold(),
            edge_pixel_threshold: Self::default_edge_pixel_threshold(),
        }
    }
}

impl ConfigValidator for ParallelPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.max_threads {
            self.validate_thread_count(threads)?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        let policy = ParallelPolicy::new()
            .with_image_threshold(2)
            .with_edge_pixel_threshold(10);
        assert!(!policy.parallel_images(2));
        assert!(policy.parallel_images(3));
        assert!(!policy.parallel_rays(10));
        assert!(policy.parallel_rays(11));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let policy: ParallelPolicy = serde_json::from_str(r#"{"max_threads": 4}"#).unwrap();
        assert_eq!(policy.max_threads, Some(4));
        assert_eq!(policy.image_threshold, 1);
        assert_eq!(policy.edge_pixel_threshold, 4_000);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let policy = ParallelPolicy::new().with_max_threads(Some(0));
        assert!(policy.validate().is_err());
    }
}
