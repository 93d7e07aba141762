//! Censor region geometry.

use crate::core::detector::BoundingBox;
use serde::{Deserialize, Serialize};

/// Rectangle fully inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A padded, clamped box plus the circle inside it that gets blurred.
///
/// Invariant: `rect` lies within `[0, image_width) x [0, image_height)` and
/// has non-zero width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CensorRegion {
    pub rect: Rect,
    /// Circle centre relative to `rect`'s origin
    pub center: (u32, u32),
    pub radius: u32,
}

impl CensorRegion {
    /// Build the region for a detection box, or `None` if nothing of the
    /// padded box lies inside the image.
    pub fn from_box(
        bbox: &BoundingBox,
        padding: u32,
        circle_scale: f32,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        let pad = i64::from(padding);
        // Boxes come from an external model; saturate instead of overflowing
        let x0 = bbox.x.saturating_sub(pad).max(0);
        let y0 = bbox.y.saturating_sub(pad).max(0);
        let x1 = bbox
            .x
            .saturating_add(bbox.width.max(0))
            .saturating_add(pad)
            .min(i64::from(image_width));
        let y1 = bbox
            .y
            .saturating_add(bbox.height.max(0))
            .saturating_add(pad)
            .min(i64::from(image_height));

        let width = x1 - x0;
        let height = y1 - y0;
        if width <= 0 || height <= 0 {
            return None;
        }

        // Bounded by the image dimensions above, so these fit in u32
        let rect = Rect {
            x: x0 as u32,
            y: y0 as u32,
            width: width as u32,
            height: height as u32,
        };

        let center = (rect.width / 2, rect.height / 2);
        let scaled = rect.width.min(rect.height) as f32 / 2.0 * circle_scale;
        let radius = if scaled.is_finite() && scaled > 0.0 {
            scaled as u32
        } else {
            0
        };

        Some(Self {
            rect,
            center,
            radius,
        })
    }

    /// Whether the pixel at `(dx, dy)`, relative to the rect origin, is
    /// inside the circular mask.
    pub fn in_mask(&self, dx: u32, dy: u32) -> bool {
        let ddx = i64::from(dx) - i64::from(self.center.0);
        let ddy = i64::from(dy) - i64::from(self.center.1);
        let r = i64::from(self.radius);
        ddx * ddx + ddy * ddy <= r * r
    }
}
