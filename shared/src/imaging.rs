//! Border-connected background matting.
//!
//! Used by the background-remover and white-background services. The
//! background color is estimated from the four corners, then every pixel
//! reachable from the image border through colors within `tolerance` of
//! that estimate is classified as background. Regions of similar color
//! enclosed by the subject are kept.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::collections::VecDeque;

/// Default per-channel color tolerance (Euclidean distance in RGB space).
pub const DEFAULT_TOLERANCE: f32 = 40.0;

/// Average color of the four corner pixels.
pub fn estimate_background(img: &RgbaImage) -> Rgb<u8> {
    let (w, h) = img.dimensions();
    let corners = [
        img.get_pixel(0, 0),
        img.get_pixel(w - 1, 0),
        img.get_pixel(0, h - 1),
        img.get_pixel(w - 1, h - 1),
    ];
    let mut sum = [0u32; 3];
    for px in corners {
        sum[0] += px[0] as u32;
        sum[1] += px[1] as u32;
        sum[2] += px[2] as u32;
    }
    Rgb([(sum[0] / 4) as u8, (sum[1] / 4) as u8, (sum[2] / 4) as u8])
}

fn color_distance(px: &Rgba<u8>, bg: &Rgb<u8>) -> f32 {
    let dr = px[0] as f32 - bg[0] as f32;
    let dg = px[1] as f32 - bg[1] as f32;
    let db = px[2] as f32 - bg[2] as f32;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Flood-fill from the border over pixels within `tolerance` of the
/// estimated background color. Returns one flag per pixel (row-major),
/// `true` meaning background.
pub fn background_mask(img: &RgbaImage, tolerance: f32) -> Vec<bool> {
    let (w, h) = img.dimensions();
    let bg = estimate_background(img);
    let mut mask = vec![false; (w * h) as usize];
    let mut queue = VecDeque::new();

    let mut seed = |x: u32, y: u32, mask: &mut Vec<bool>, queue: &mut VecDeque<(u32, u32)>| {
        let idx = (y * w + x) as usize;
        if !mask[idx] && color_distance(img.get_pixel(x, y), &bg) <= tolerance {
            mask[idx] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        seed(x, 0, &mut mask, &mut queue);
        seed(x, h - 1, &mut mask, &mut queue);
    }
    for y in 0..h {
        seed(0, y, &mut mask, &mut queue);
        seed(w - 1, y, &mut mask, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < w && ny < h {
                seed(nx, ny, &mut mask, &mut queue);
            }
        }
    }

    mask
}

/// Background pixels become fully transparent.
pub fn remove_background(img: &RgbaImage, tolerance: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let mask = background_mask(img, tolerance);
    let mut out = img.clone();
    for y in 0..h {
        for x in 0..w {
            if mask[(y * w + x) as usize] {
                out.get_pixel_mut(x, y)[3] = 0;
            }
        }
    }
    out
}

/// Background pixels become opaque white; any existing alpha is composited
/// over white as well.
pub fn flatten_on_white(img: &RgbaImage, tolerance: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    let mask = background_mask(img, tolerance);
    let mut out = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let px = img.get_pixel(x, y);
            let target = if mask[(y * w + x) as usize] {
                Rgb([255, 255, 255])
            } else {
                let alpha = px[3] as f32 / 255.0;
                Rgb([
                    (px[0] as f32 * alpha + 255.0 * (1.0 - alpha)) as u8,
                    (px[1] as f32 * alpha + 255.0 * (1.0 - alpha)) as u8,
                    (px[2] as f32 * alpha + 255.0 * (1.0 - alpha)) as u8,
                ])
            };
            out.put_pixel(x, y, target);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 12x12 white canvas with a solid red 4x4 square in the middle.
    fn red_square_on_white() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(12, 12, Rgba([255, 255, 255, 255]));
        for y in 4..8 {
            for x in 4..8 {
                img.put_pixel(x, y, Rgba([200, 20, 20, 255]));
            }
        }
        img
    }

    #[test]
    fn test_background_estimate_uses_corners() {
        let img = red_square_on_white();
        assert_eq!(estimate_background(&img), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_subject_survives_removal() {
        let out = remove_background(&red_square_on_white(), DEFAULT_TOLERANCE);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(11, 11)[3], 0);
        assert_eq!(out.get_pixel(5, 5)[3], 255);
        assert_eq!(out.get_pixel(5, 5)[0], 200);
    }

    #[test]
    fn test_enclosed_region_is_kept() {
        // Red ring with a white hole: the hole is background-colored but
        // not border-connected, so it must stay opaque.
        let mut img = red_square_on_white();
        img.put_pixel(5, 5, Rgba([255, 255, 255, 255]));
        for y in 4..8 {
            for x in 4..8 {
                if !(x == 5 && y == 5) {
                    img.put_pixel(x, y, Rgba([200, 20, 20, 255]));
                }
            }
        }
        let out = remove_background(&img, DEFAULT_TOLERANCE);
        assert_eq!(out.get_pixel(5, 5)[3], 255);
    }

    #[test]
    fn test_flatten_on_white() {
        let mut img = red_square_on_white();
        // Semi-transparent black pixel inside the subject
        img.put_pixel(5, 5, Rgba([0, 0, 0, 128]));
        let out = flatten_on_white(&img, DEFAULT_TOLERANCE);
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(4, 4), Rgb([200, 20, 20]));
        // Alpha composited toward white
        let blended = out.get_pixel(5, 5);
        assert!(blended[0] > 100 && blended[0] < 150);
    }
}
