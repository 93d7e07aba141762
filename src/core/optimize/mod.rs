//! # Optimize Module
//!
//! Proportional downscale and flattening to RGB ahead of the JPEG re-encode.
//!
//! The longer side is bounded: landscape images are limited by `max_width`,
//! portrait and square images by `max_height`. Images already within bounds
//! keep their size; nothing is ever upscaled.

use crate::core::resize::FastResizer;
use crate::error::ImageError;
use image::{DynamicImage, RgbImage};

/// Default bound on the output width
pub const DEFAULT_MAX_WIDTH: u32 = 4000;
/// Default bound on the output height
pub const DEFAULT_MAX_HEIGHT: u32 = 4000;
/// Default JPEG quality for optimized output
pub const DEFAULT_QUALITY: u8 = 80;

/// Output dimensions for an image of `width` x `height`.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width > height {
        if width > max_width {
            let scaled = (f64::from(max_width) / f64::from(width) * f64::from(height)) as u32;
            return (max_width, scaled.max(1));
        }
    } else if height > max_height {
        let scaled = (f64::from(max_height) / f64::from(height) * f64::from(width)) as u32;
        return (scaled.max(1), max_height);
    }
    (width, height)
}

/// Downscale `image` to fit the bounds and drop any alpha channel.
pub fn optimize(
    resizer: &mut FastResizer,
    image: &DynamicImage,
    max_width: u32,
    max_height: u32,
) -> Result<RgbImage, ImageError> {
    let rgb = image.to_rgb8();
    let (width, height) = scaled_dimensions(rgb.width(), rgb.height(), max_width, max_height);

    if (width, height) == rgb.dimensions() {
        return Ok(rgb);
    }

    resizer.resize_rgb(&rgb, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn landscape_is_bounded_by_width() {
        assert_eq!(scaled_dimensions(8000, 4000, 4000, 4000), (4000, 2000));
        assert_eq!(scaled_dimensions(6000, 4000, 3000, 100), (3000, 2000));
    }

    #[test]
    fn portrait_is_bounded_by_height() {
        assert_eq!(scaled_dimensions(3000, 6000, 4000, 4000), (2000, 4000));
    }

    #[test]
    fn square_uses_height_rule() {
        assert_eq!(scaled_dimensions(5000, 5000, 100, 4000), (4000, 4000));
    }

    #[test]
    fn small_images_are_never_upscaled() {
        assert_eq!(scaled_dimensions(640, 480, 4000, 4000), (640, 480));
        assert_eq!(scaled_dimensions(480, 640, 4000, 4000), (480, 640));
    }

    #[test]
    fn output_never_exceeds_input() {
        for (w, h) in [(1, 1), (10, 3000), (3000, 10), (4001, 4000), (7, 9000), (12345, 6789)] {
            for (mw, mh) in [(1, 1), (100, 100), (4000, 4000), (5000, 10)] {
                let (ow, oh) = scaled_dimensions(w, h, mw, mh);
                assert!(ow <= w && oh <= h, "{w}x{h} max {mw}x{mh} -> {ow}x{oh}");
            }
        }
    }

    #[test]
    fn optimize_flattens_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([9, 8, 7, 10])));
        let mut resizer = FastResizer::new();

        let optimized = optimize(&mut resizer, &image, 150, 150).unwrap();

        assert_eq!(optimized.dimensions(), (150, 100));
    }
}
