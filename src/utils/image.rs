//! Utility functions for image loading and conversion.
//!
//! The detector works on 8-bit RGB input. These helpers load files and check the
//! pixel depth of decoded images.

use crate::core::OCRError;
use image::{ColorType, DynamicImage, RgbImage};

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Errors
///
/// This function will return an `OCRError::ImageLoad` error if the image cannot
/// be loaded from the specified path.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, OCRError> {
    let img = image::open(path).map_err(OCRError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Converts a decoded image to 8-bit RGB, rejecting deeper pixel formats.
///
/// # Errors
///
/// Returns `InvalidInput` for 16-bit and floating-point images and for images
/// with zero width or height.
pub fn to_rgb8_checked(img: &DynamicImage) -> Result<RgbImage, OCRError> {
    match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {}
        other => {
            return Err(OCRError::invalid_input(format!(
                "unsupported pixel format {:?}, expected 8 bits per channel",
                other
            )));
        }
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(OCRError::invalid_input("image has zero width or height"));
    }
    Ok(img.to_rgb8())
}
