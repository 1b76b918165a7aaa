//! Error types for the detection pipeline.
//!
//! Failures local to a single component, chain or ray never surface here; those
//! candidates are dropped and logged. The variants below cover the conditions that
//! abort a whole call: unreadable input, bad configuration, inconsistent rasters
//! and recognizer faults.

use thiserror::Error;

/// Stages of the detection pipeline, used to tag processing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Ray casting and median refinement.
    StrokeWidth,
    /// Calls into the external text recognizer.
    Recognition,
    /// Multi-image batch driver.
    BatchProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::StrokeWidth => write!(f, "stroke width transform"),
            ProcessingStage::Recognition => write!(f, "recognition"),
            ProcessingStage::BatchProcessing => write!(f, "batch processing"),
        }
    }
}

/// Two rasters that must cover the same pixels differ in size.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{expected:?} raster does not match {actual:?}")]
pub struct DimensionMismatch {
    /// Width and height of the reference raster.
    pub expected: (u32, u32),
    /// Width and height of the other raster.
    pub actual: (u32, u32),
}

/// Errors that can abort a detection call.
#[derive(Error, Debug)]
pub enum OCRError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },
}

impl OCRError {
    /// Creates an OCRError for processing operations.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an OCRError for a failure reported by the text recognizer.
    ///
    /// # Arguments
    ///
    /// * `context` - What the recognizer was asked to do.
    /// * `error` - The recognizer's own error.
    pub fn recognition_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::Recognition, context, error)
    }

    /// Creates an OCRError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an OCRError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Returns the pipeline stage for processing errors.
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::Processing { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<image::ImageError> for OCRError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<crate::core::config::ConfigError> for OCRError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type OcrResult<T> = Result<T, OCRError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_stage_display() {
        assert_eq!(ProcessingStage::StrokeWidth.to_string(), "stroke width transform");
        assert_eq!(ProcessingStage::Recognition.to_string(), "recognition");
    }

    #[test]
    fn test_recognition_error_carries_stage_and_source() {
        let source = std::io::Error::other("engine crashed");
        let err = OCRError::recognition_error("reading chain 2", source);

        assert_eq!(err.stage(), Some(ProcessingStage::Recognition));
        assert_eq!(err.to_string(), "recognition failed: reading chain 2");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("engine crashed"));
    }

    #[test]
    fn test_dimension_mismatch_as_source() {
        let err = OCRError::processing_error(
            ProcessingStage::StrokeWidth,
            "edge map and gradient field",
            DimensionMismatch {
                expected: (4, 3),
                actual: (3, 3),
            },
        );
        assert_eq!(err.stage(), Some(ProcessingStage::StrokeWidth));
        assert_eq!(
            err.to_string(),
            "stroke width transform failed: edge map and gradient field"
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("(4, 3) raster does not match (3, 3)"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: OCRError = crate::core::config::ConfigError::InvalidConfig {
            message: "bad".to_string(),
        }
        .into();
        assert!(matches!(err, OCRError::ConfigError { .. }));
        assert!(err.stage().is_none());
    }
}
