//! Configuration management for the detection pipeline.
//!
//! This module provides configuration types, validation traits, and utilities
//! for loading detector settings.

pub mod detection;
pub mod errors;
pub mod parallel;

pub use detection::{
    ChainConfig, ComponentFilterConfig, DetectionConfig, EdgeConfig, LogCategories, NestedRule,
    RegionConfig,
};
pub use errors::{ConfigError, ConfigValidator};
pub use parallel::ParallelPolicy;
