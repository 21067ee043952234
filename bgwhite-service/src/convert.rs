//! Replace the detected background with solid white and flatten to JPEG.

use std::path::Path;

use shared::{imaging, ConvertError};

/// Allowed upload extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Load `input`, mask out the border-connected background, composite the
/// subject onto a white canvas, and save as JPEG to `output`.
pub fn whiten_background_file(
    input: &Path,
    output: &Path,
    tolerance: f32,
) -> Result<(), ConvertError> {
    let img = image::open(input)?.to_rgba8();
    let flattened = imaging::flatten_on_white(&img, tolerance);
    flattened.save(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_background_becomes_white() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");

        // dark background, bright subject in the middle
        let mut img = RgbaImage::from_pixel(16, 16, Rgba([30, 30, 30, 255]));
        for y in 6..10 {
            for x in 6..10 {
                img.put_pixel(x, y, Rgba([240, 40, 40, 255]));
            }
        }
        img.save(&input).unwrap();

        whiten_background_file(&input, &output, imaging::DEFAULT_TOLERANCE).unwrap();

        let result = image::open(&output).unwrap().to_rgb8();
        // JPEG is lossy; check the corner is near-white and the subject is not
        let corner = result.get_pixel(0, 0);
        assert!(corner[0] > 240 && corner[1] > 240 && corner[2] > 240);
        let center = result.get_pixel(8, 8);
        assert!(center[0] > 180 && center[1] < 120);
    }

    #[test]
    fn test_unreadable_image_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        std::fs::write(&input, b"garbage").unwrap();
        let err = whiten_background_file(
            &input,
            &dir.path().join("out.jpg"),
            imaging::DEFAULT_TOLERANCE,
        )
        .unwrap_err();
        assert_eq!(err.http_status_code(), 500);
    }
}
