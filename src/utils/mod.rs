//! Utility functions for the detector.
//!
//! This module provides image loading helpers, debug renderings and logging setup.

pub mod image;
pub mod visualization;

pub use image::{load_image, to_rgb8_checked};
pub use visualization::{DebugArtifacts, render_chains, render_components, render_stroke_widths};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
