//! Blur-and-composite over censor regions.

use super::blur::gaussian_blur;
use super::{CensorConfig, CensorRegion};
use crate::core::detector::Detection;
use image::{imageops, DynamicImage, ImageBuffer, Pixel};

/// Result of censoring one image
#[derive(Debug, Clone)]
pub struct CensorOutput {
    pub image: DynamicImage,
    /// Regions actually blurred (wanted detections that survived clamping)
    pub regions: Vec<CensorRegion>,
}

impl CensorOutput {
    /// Whether any pixel was changed
    pub fn touched(&self) -> bool {
        !self.regions.is_empty()
    }
}

/// Blur every wanted detection in `image`.
///
/// Returns the input unchanged when no detection matches the wanted labels
/// or every matching box falls outside the image.
pub fn censor_image(image: DynamicImage, detections: &[Detection], config: &CensorConfig) -> CensorOutput {
    let (width, height) = (image.width(), image.height());

    let regions: Vec<CensorRegion> = detections
        .iter()
        .filter(|d| config.wants(&d.label))
        .filter_map(|d| CensorRegion::from_box(&d.bbox, config.padding, config.circle_scale, width, height))
        .collect();

    if regions.is_empty() {
        return CensorOutput { image, regions };
    }

    let kernel = config.effective_kernel();
    let image = if image.color().has_alpha() {
        let mut buffer = image.to_rgba8();
        apply_regions(&mut buffer, &regions, kernel);
        DynamicImage::ImageRgba8(buffer)
    } else {
        let mut buffer = image.to_rgb8();
        apply_regions(&mut buffer, &regions, kernel);
        DynamicImage::ImageRgb8(buffer)
    };

    CensorOutput { image, regions }
}

fn apply_regions<P>(buffer: &mut ImageBuffer<P, Vec<u8>>, regions: &[CensorRegion], kernel: u32)
where
    P: Pixel<Subpixel = u8> + 'static,
{
    for region in regions {
        let rect = region.rect;
        let patch = imageops::crop_imm(&*buffer, rect.x, rect.y, rect.width, rect.height).to_image();
        let blurred = gaussian_blur(&patch, kernel);

        for dy in 0..rect.height {
            for dx in 0..rect.width {
                if region.in_mask(dx, dy) {
                    buffer.put_pixel(rect.x + dx, rect.y + dy, *blurred.get_pixel(dx, dy));
                }
            }
        }
    }
}
