//! 1-bit black-and-white conversion with error-diffusion dithering.

use std::path::Path;

use image::imageops::{self, colorops::BiLevel};
use shared::ConvertError;

/// Allowed upload extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"];

/// Pick an output extension the grayscale encoder supports. Formats
/// without a dependable 8-bit luma encoder fall back to PNG.
pub fn output_extension(input_ext: &str) -> &'static str {
    match input_ext {
        "jpg" | "jpeg" => "jpg",
        "bmp" => "bmp",
        "tiff" => "tiff",
        _ => "png",
    }
}

/// Convert `input` to a dithered black-and-white image at `output`.
///
/// Grayscale first, then Floyd-Steinberg dithering against a two-color
/// palette, so every output pixel ends up pure black or pure white.
pub fn to_black_and_white(input: &Path, output: &Path) -> Result<(), ConvertError> {
    let mut gray = image::open(input)?.to_luma8();
    imageops::dither(&mut gray, &BiLevel);
    gray.save(output)?;
    Ok(())
}
