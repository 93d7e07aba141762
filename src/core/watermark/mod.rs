//! # Watermark Module
//!
//! Brand overlays for the optimize + watermark stage.
//!
//! - `brands` - brand name to asset-path registry, loadable from JSON
//! - `compositor` - orientation-aware, centred, alpha-blended overlay

mod brands;
mod compositor;

pub use brands::{parse_brand, BrandAssets, BrandRegistry};
pub use compositor::{apply_watermark, overlay_position, scaled_asset_size, WatermarkAsset};

/// Default overlay opacity
pub const DEFAULT_OPACITY: f32 = 0.7;

/// Fraction of the target width the overlay spans
pub const WATERMARK_WIDTH_RATIO: f64 = 0.95;
