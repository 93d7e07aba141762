//! Overlay compositing.

use super::{BrandAssets, WATERMARK_WIDTH_RATIO};
use crate::core::codec;
use crate::core::resize::FastResizer;
use crate::error::{CensorError, ConfigError, ImageError};
use image::{imageops, DynamicImage, RgbImage, RgbaImage};

/// Decoded portrait/landscape overlay pair for one brand
#[derive(Debug, Clone)]
pub struct WatermarkAsset {
    pub brand: String,
    pub portrait: RgbaImage,
    pub landscape: RgbaImage,
}

impl WatermarkAsset {
    pub fn new(brand: impl Into<String>, portrait: RgbaImage, landscape: RgbaImage) -> Self {
        Self {
            brand: brand.into(),
            portrait,
            landscape,
        }
    }

    /// Decode both overlay files. Sources without alpha become fully opaque.
    pub fn load(brand: &str, assets: &BrandAssets) -> Result<Self, CensorError> {
        let load_one = |path: &std::path::Path| -> Result<RgbaImage, CensorError> {
            if !path.is_file() {
                return Err(ConfigError::MissingAsset {
                    brand: brand.to_string(),
                    path: path.to_path_buf(),
                }
                .into());
            }
            codec::decode(path).map(|img| img.to_rgba8()).map_err(|e| {
                CensorError::Config(ConfigError::BrandFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            })
        };

        Ok(Self::new(
            brand,
            load_one(&assets.portrait)?,
            load_one(&assets.landscape)?,
        ))
    }

    /// Landscape overlay for landscape targets, portrait otherwise
    pub fn select(&self, width: u32, height: u32) -> &RgbaImage {
        if width > height {
            &self.landscape
        } else {
            &self.portrait
        }
    }
}

/// Overlay size for a target of `target_width`: 95% of the target width,
/// keeping the asset's aspect ratio.
pub fn scaled_asset_size(target_width: u32, asset_width: u32, asset_height: u32) -> (u32, u32) {
    let width = ((f64::from(target_width) * WATERMARK_WIDTH_RATIO) as u32).max(1);
    let height = ((f64::from(width) / f64::from(asset_width.max(1)) * f64::from(asset_height)) as u32).max(1);
    (width, height)
}

/// Top-left corner that centres an overlay on the target:
/// `(target - overlay) / 2` per axis, rounded toward negative infinity.
/// Negative when the overlay is larger than the target; the overflow is
/// clipped.
pub fn overlay_position(target: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
    let x = (i64::from(target.0) - i64::from(overlay.0)).div_euclid(2);
    let y = (i64::from(target.1) - i64::from(overlay.1)).div_euclid(2);
    (x, y)
}

/// Centre the brand overlay on `base` and flatten the result to RGB.
///
/// `opacity` scales the overlay's own alpha: 1.0 keeps it as drawn, 0.0 makes
/// it invisible.
pub fn apply_watermark(
    resizer: &mut FastResizer,
    base: &DynamicImage,
    asset: &WatermarkAsset,
    opacity: f32,
) -> Result<RgbImage, ImageError> {
    let (width, height) = (base.width(), base.height());
    let source = asset.select(width, height);
    let (overlay_width, overlay_height) = scaled_asset_size(width, source.width(), source.height());

    let mut overlay = resizer.resize_rgba(source, overlay_width, overlay_height)?;
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in overlay.pixels_mut() {
        pixel[3] = (f32::from(pixel[3]) * opacity) as u8;
    }

    let (x, y) = overlay_position((width, height), (overlay_width, overlay_height));
    let mut canvas = base.to_rgba8();
    imageops::overlay(&mut canvas, &overlay, x, y);

    Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn asset() -> WatermarkAsset {
        // Portrait is tall and red, landscape is wide and blue
        WatermarkAsset::new(
            "TEST",
            RgbaImage::from_pixel(50, 100, Rgba([255, 0, 0, 200])),
            RgbaImage::from_pixel(200, 50, Rgba([0, 0, 255, 200])),
        )
    }

    #[test]
    fn orientation_selects_asset() {
        let asset = asset();
        assert_eq!(asset.select(400, 200).width(), 200);
        assert_eq!(asset.select(200, 400).width(), 50);
        assert_eq!(asset.select(300, 300).width(), 50);
    }

    #[test]
    fn overlay_is_95_percent_of_target_width() {
        assert_eq!(scaled_asset_size(1000, 200, 50), (950, 237));
        assert_eq!(scaled_asset_size(400, 50, 100), (380, 760));
        for target in [1u32, 7, 99, 640, 1921, 4000] {
            let (w, _) = scaled_asset_size(target, 300, 100);
            let expected = f64::from(target) * 0.95;
            assert!((f64::from(w) - expected).abs() <= 1.0, "{target} -> {w}");
        }
    }

    #[test]
    fn overlay_is_centred() {
        assert_eq!(overlay_position((400, 200), (380, 95)), (10, 52));
        assert_eq!(overlay_position((100, 100), (95, 300)), (2, -100));
    }

    #[test]
    fn centring_floors_the_size_difference() {
        // Odd differences on both axes
        assert_eq!(overlay_position((400, 200), (381, 95)), (9, 52));
        assert_eq!(overlay_position((101, 50), (100, 51)), (0, -1));
        assert_eq!(overlay_position((10, 10), (10, 10)), (0, 0));
    }

    #[test]
    fn landscape_overlay_with_half_opacity() {
        let base = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 200, Rgb([0, 0, 0])));
        let mut resizer = FastResizer::new();

        let result = apply_watermark(&mut resizer, &base, &asset(), 0.5).unwrap();

        assert_eq!(result.dimensions(), (400, 200));
        // Overlay spans 380x95 at (10, 52); alpha 200 * 0.5 = 100 over black
        let centre = result.get_pixel(200, 100);
        let expected = (255.0 * 100.0 / 255.0) as i32;
        assert_eq!(centre[0], 0);
        assert!((i32::from(centre[2]) - expected).abs() <= 2, "centre {:?}", centre);
        // Outside the overlay the base is untouched
        assert_eq!(result.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(result.get_pixel(200, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn zero_opacity_is_invisible() {
        let base = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 240, Rgb([40, 50, 60])));
        let mut resizer = FastResizer::new();

        let result = apply_watermark(&mut resizer, &base, &asset(), 0.0).unwrap();

        assert!(result.pixels().all(|p| *p == Rgb([40, 50, 60])));
    }
}
