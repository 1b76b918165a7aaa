//! Core types shared by every pipeline stage.
//!
//! This module contains the error types, configuration and default constants.

pub mod config;
pub mod constants;
pub mod errors;

pub use config::{ConfigError, ConfigValidator, DetectionConfig, LogCategories, ParallelPolicy};
pub use constants::*;
pub use errors::{DimensionMismatch, OCRError, OcrResult, ProcessingStage};
