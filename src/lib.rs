//! # Bib Detect
//!
//! Finds and reads the numbers printed on race bibs in photographs using the
//! Stroke Width Transform.
//!
//! ## Stages
//!
//! - **Edges**: Canny edges and Scharr gradients of the grayscale image
//! - **Stroke widths**: rays cast across strokes give every pixel a width
//! - **Components**: pixels of consistent width grouped into letter candidates
//! - **Filtering**: candidates rejected by size, aspect ratio and nesting
//! - **Chains**: similar neighbouring candidates merged into text lines
//! - **Recognition**: each line deskewed, binarized and handed to an OCR engine
//!
//! The OCR engine itself is supplied by the caller through
//! [`recognition::TextRecognizer`].
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants and error handling
//! * [`processors`] - The individual detection stages
//! * [`recognition`] - The OCR engine seam and reading validation
//! * [`pipeline`] - The detector, batch processing and statistics
//! * [`utils`] - Image loading, debug renderings and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bib_detect::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Any closure returning the engine's text can serve as a recognizer.
//! let recognizer = |patch: &image::GrayImage| -> OcrResult<String> {
//!     Ok(format!("{}", patch.width()))
//! };
//! let detector = TextDetector::new(DetectionConfig::default(), recognizer)?;
//!
//! let image = load_image(Path::new("runner.jpg"))?;
//! let result = detector.detect(&image)?;
//! println!("numbers: {:?}", result.unique_numbers());
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust,no_run
//! use bib_detect::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DetectionConfig::from_json_str(r#"
//! {
//!   "dark_on_light": true,
//!   "min_character_height": 12,
//!   "bottom_border": 40,
//!   "components": { "max_variance_ratio": 2.0 }
//! }
//! "#)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod pipeline;
pub mod processors;
pub mod recognition;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use bib_detect::prelude::*;
/// ```
///
/// Stage types live in [`crate::processors`] for callers that run stages
/// individually.
pub mod prelude {
    pub use crate::core::config::{ConfigValidator, DetectionConfig, ParallelPolicy};
    pub use crate::core::{OCRError, OcrResult};
    pub use crate::pipeline::{
        BatchReport, DetectionResult, DetectionStats, TextDetector, detect_batch, detect_paths,
    };
    pub use crate::recognition::{FixedRecognizer, RecognizerSettings, TextRecognizer};
    pub use crate::utils::load_image;
}
