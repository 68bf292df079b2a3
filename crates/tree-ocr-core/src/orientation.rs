//! Page orientation correction.

use image::{DynamicImage, Rgba, RgbaImage};
use tracing::info;
use tree_ocr_types::RecognizeError;

use crate::engine::OcrEngine;

/// Cubic convolution coefficient (same as OpenCV's bicubic).
const CUBIC_A: f32 = -0.75;

/// Detect page rotation with the engine and return an upright image.
pub fn correct_orientation(
    engine: &dyn OcrEngine,
    image: DynamicImage,
) -> Result<DynamicImage, RecognizeError> {
    let orientation = engine.detect_orientation(&image).map_err(|e| match e {
        RecognizeError::Orientation(_) => e,
        other => RecognizeError::Orientation(other.to_string()),
    })?;

    if orientation.is_upright() {
        info!("Rotation angle: 0");
        return Ok(image);
    }

    info!(
        "Image is rotated by {} degrees (confidence {:.2}), correcting",
        orientation.rotate, orientation.confidence
    );
    Ok(rotate_image(image, orientation.rotate as f32))
}

/// Rotate an image clockwise by `degrees`.
///
/// Right angles are exact pixel permutations and swap width and height for
/// 90 and 270. Other angles rotate about the centre on the original canvas
/// with bicubic sampling; samples outside the source repeat the nearest edge
/// pixel.
pub fn rotate_image(image: DynamicImage, degrees: f32) -> DynamicImage {
    let normalized = degrees.rem_euclid(360.0);
    if normalized.fract() == 0.0 {
        match normalized as u32 {
            0 => return image,
            90 => return image.rotate90(),
            180 => return image.rotate180(),
            270 => return image.rotate270(),
            _ => {}
        }
    }
    DynamicImage::ImageRgba8(rotate_about_center(&image.to_rgba8(), normalized))
}

fn rotate_about_center(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (width, height) = src.dimensions();
    let mut out = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        // Inverse of a clockwise rotation in y-down coordinates
        let sx = cos * dx + sin * dy + cx;
        let sy = -sin * dx + cos * dy + cy;
        *pixel = sample_bicubic(src, sx, sy);
    }

    out
}

fn cubic_weight(t: f32) -> f32 {
    let t = t.abs();
    if t <= 1.0 {
        ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        ((CUBIC_A * t - 5.0 * CUBIC_A) * t + 8.0 * CUBIC_A) * t - 4.0 * CUBIC_A
    } else {
        0.0
    }
}

fn sample_bicubic(src: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (width, height) = src.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let mut acc = [0.0f32; 4];
    for j in -1..=2i64 {
        let wy = cubic_weight(fy - j as f32);
        let py = (y0 as i64 + j).clamp(0, height as i64 - 1) as u32;
        for i in -1..=2i64 {
            let w = wy * cubic_weight(fx - i as f32);
            let px = (x0 as i64 + i).clamp(0, width as i64 - 1) as u32;
            let p = src.get_pixel(px, py);
            for (c, value) in acc.iter_mut().enumerate() {
                *value += w * p[c] as f32;
            }
        }
    }

    Rgba(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
}
