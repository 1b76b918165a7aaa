//! Detection statistics.
//!
//! `DetectionStats` records what each stage produced for one image;
//! `BatchStats` summarizes a batch run.

use std::fmt;
use std::time::Duration;

/// Per-stage counters for one detection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionStats {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Edge pixels found by Canny.
    pub edge_pixels: usize,
    /// Rays accepted by the stroke width transform.
    pub rays: usize,
    /// Pixels with an assigned stroke width.
    pub stroke_pixels: usize,
    /// Connected components before filtering.
    pub raw_components: usize,
    /// Components kept by the geometry filter.
    pub valid_components: usize,
    /// Component pairs passing the pairing tests.
    pub eligible_pairs: usize,
    /// Merge passes run by the chain builder.
    pub merge_passes: usize,
    /// Chains with enough members.
    pub chains: usize,
    /// Chains rejected for size, tilt or an empty crop.
    pub rejected_regions: usize,
    /// Recognizer calls.
    pub recognizer_calls: usize,
    /// Recognizer calls that returned an error.
    pub recognizer_errors: usize,
    /// Readings accepted as numbers.
    pub accepted: usize,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

impl fmt::Display for DetectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detection Statistics ({}x{}):", self.width, self.height)?;
        writeln!(f, "  Edge pixels: {}", self.edge_pixels)?;
        writeln!(
            f,
            "  Rays: {} covering {} pixels",
            self.rays, self.stroke_pixels
        )?;
        writeln!(
            f,
            "  Components: {} raw, {} valid",
            self.raw_components, self.valid_components
        )?;
        writeln!(
            f,
            "  Chains: {} from {} pairs in {} passes",
            self.chains, self.eligible_pairs, self.merge_passes
        )?;
        writeln!(
            f,
            "  Recognition: {} accepted of {} calls ({} errors, {} regions rejected)",
            self.accepted, self.recognizer_calls, self.recognizer_errors, self.rejected_regions
        )?;
        writeln!(f, "  Elapsed: {:.2} ms", self.elapsed.as_secs_f64() * 1000.0)?;
        Ok(())
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStats {
    /// The total number of images processed.
    pub total_processed: usize,
    /// Images for which detection completed.
    pub successful: usize,
    /// Images for which detection returned an error.
    pub failed: usize,
    /// Numbers read across all images.
    pub numbers_found: usize,
    /// The average detection time in milliseconds over successful images.
    pub average_time_ms: f64,
}

impl BatchStats {
    /// Returns the success rate as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            (self.successful as f64 / self.total_processed as f64) * 100.0
        }
    }

    /// Returns the average processing speed in images per second.
    pub fn images_per_second(&self) -> f64 {
        if self.average_time_ms == 0.0 {
            0.0
        } else {
            1000.0 / self.average_time_ms
        }
    }

    /// Adds one image's outcome.
    pub fn record(&mut self, outcome: Option<&DetectionStats>) {
        self.total_processed += 1;
        match outcome {
            Some(stats) => {
                let previous = self.average_time_ms * self.successful as f64;
                self.successful += 1;
                self.numbers_found += stats.accepted;
                self.average_time_ms = (previous + stats.elapsed.as_secs_f64() * 1000.0)
                    / self.successful as f64;
            }
            None => self.failed += 1,
        }
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Statistics:")?;
        writeln!(f, "  Total processed: {}", self.total_processed)?;
        writeln!(
            f,
            "  Successful: {} ({:.1}%)",
            self.successful,
            self.success_rate()
        )?;
        writeln!(f, "  Failed: {}", self.failed)?;
        writeln!(f, "  Numbers found: {}", self.numbers_found)?;
        writeln!(f, "  Average detection time: {:.2} ms", self.average_time_ms)?;
        writeln!(
            f,
            "  Processing speed: {:.2} images/sec",
            self.images_per_second()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_zero_processed() {
        let stats = BatchStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.images_per_second(), 0.0);
    }

    #[test]
    fn record_averages_successful_runs() {
        let mut stats = BatchStats::default();
        let run = |ms: u64, accepted: usize| DetectionStats {
            accepted,
            elapsed: Duration::from_millis(ms),
            ..DetectionStats::default()
        };
        stats.record(Some(&run(10, 1)));
        stats.record(Some(&run(30, 2)));
        stats.record(None);

        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.numbers_found, 3);
        assert!((stats.average_time_ms - 20.0).abs() < 1e-9);
        assert!((stats.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn display_includes_counts() {
        let stats = DetectionStats {
            width: 640,
            height: 480,
            raw_components: 12,
            valid_components: 5,
            ..DetectionStats::default()
        };
        let text = stats.to_string();
        assert!(text.contains("640x480"));
        assert!(text.contains("12 raw, 5 valid"));
    }
}
