//! Bounding-box resize and WebP encoding of a single derivative.
//!
//! All functions here are CPU bound; callers run them on the blocking pool.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use tracing::debug;

use crate::errors::ImageError;

/// A derivative encoded in memory, ready to be written.
#[derive(Debug)]
pub struct RenderedDerivative {
    pub size: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decodes raw bytes into a raster image, guessing the format from content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
}

/// Dimensions that fit `width`×`height` into a `size`×`size` box.
///
/// The longer edge becomes `size`; the shorter edge keeps the aspect ratio,
/// rounded and never below 1.
pub fn fit_within(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (size, size);
    }

    let scale = |edge: u32, long: u32| -> u32 {
        let scaled = (edge as f64 * size as f64 / long as f64).round() as u32;
        scaled.clamp(1, size)
    };

    if width >= height {
        (size, scale(height, width))
    } else {
        (scale(width, height), size)
    }
}

/// Resizes `img` into a `size`×`size` box and encodes it as WebP.
pub fn render_webp(img: &DynamicImage, size: u32) -> Result<RenderedDerivative, ImageError> {
    let (width, height) = fit_within(img.width(), img.height(), size);

    let resized = if (width, height) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    // The WebP encoder only accepts 8-bit RGB(A)
    let resized = if resized.color().has_alpha() {
        DynamicImage::ImageRgba8(resized.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(resized.to_rgb8())
    };

    let mut cursor = Cursor::new(Vec::new());
    resized
        .write_to(&mut cursor, ImageFormat::WebP)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    let data = cursor.into_inner();

    debug!(size, width, height, bytes = data.len(), "Rendered derivative");

    Ok(RenderedDerivative {
        size,
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn fit_within_landscape() {
        assert_eq!(fit_within(2000, 1000, 800), (800, 400));
        assert_eq!(fit_within(1200, 800, 600), (600, 400));
    }

    #[test]
    fn fit_within_portrait() {
        assert_eq!(fit_within(800, 1200, 600), (400, 600));
    }

    #[test]
    fn fit_within_square() {
        assert_eq!(fit_within(1000, 1000, 75), (75, 75));
    }

    #[test]
    fn fit_within_never_collapses_to_zero() {
        assert_eq!(fit_within(10_000, 10, 75), (75, 1));
    }

    #[test]
    fn fit_within_scales_small_images_to_the_box() {
        assert_eq!(fit_within(50, 25, 300), (300, 150));
    }

    #[test]
    fn render_webp_produces_decodable_output() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([10, 20, 30])));

        let rendered = render_webp(&img, 75).unwrap();

        assert_eq!((rendered.width, rendered.height), (75, 38));
        let decoded = image::load_from_memory_with_format(&rendered.data, ImageFormat::WebP).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (75, 38));
    }

    #[test]
    fn render_webp_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 128])));

        let rendered = render_webp(&img, 20).unwrap();
        let decoded = image::load_from_memory(&rendered.data).unwrap();

        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn decode_rejects_text() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
