//! File-level wrapper around the shared matting primitives.

use std::path::Path;

use shared::{imaging, ConvertError};

/// Allowed upload extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// Load `input`, make the border-connected background transparent, and
/// write the result as RGBA PNG to `output`.
pub fn remove_background_file(
    input: &Path,
    output: &Path,
    tolerance: f32,
) -> Result<(), ConvertError> {
    let img = image::open(input)?.to_rgba8();
    let cut_out = imaging::remove_background(&img, tolerance);
    cut_out.save(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_output_is_transparent_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");

        let mut img = RgbaImage::from_pixel(16, 16, Rgba([250, 250, 250, 255]));
        for y in 6..10 {
            for x in 6..10 {
                img.put_pixel(x, y, Rgba([10, 120, 10, 255]));
            }
        }
        img.save(&input).unwrap();

        remove_background_file(&input, &output, imaging::DEFAULT_TOLERANCE).unwrap();

        let result = image::open(&output).unwrap().to_rgba8();
        assert_eq!(result.get_pixel(0, 0)[3], 0);
        assert_eq!(result.get_pixel(8, 8)[3], 255);
    }

    #[test]
    fn test_unreadable_image_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        std::fs::write(&input, b"not an image").unwrap();
        let err = remove_background_file(
            &input,
            &dir.path().join("out.png"),
            imaging::DEFAULT_TOLERANCE,
        )
        .unwrap_err();
        assert_eq!(err.http_status_code(), 500);
    }
}
