//! # Core Module
//!
//! The front-end agnostic censoring engine.
//!
//! ## Modules
//! - `scanner` - Lists candidate images in a folder
//! - `codec` - Decodes and encodes image files
//! - `detector` - Boundary to the detection model
//! - `censor` - Blurs detected regions
//! - `resize` - SIMD resizing shared by the optimize and watermark steps
//! - `optimize` - Bounded downscale before re-encoding
//! - `watermark` - Brand registry and overlay compositing
//! - `batch` - Bounded-concurrency per-file executor
//! - `sample` - Optional every-Nth copy stage
//! - `pipeline` - Orchestrates the full workflow

pub mod batch;
pub mod censor;
pub mod codec;
pub mod detector;
pub mod optimize;
pub mod pipeline;
pub mod resize;
pub mod sample;
pub mod scanner;
pub mod watermark;

// Re-export commonly used types
pub use batch::{BatchSummary, CancellationToken, ItemStatus, Outcome};
pub use censor::{censor_image, CensorConfig, CensorRegion};
pub use detector::{BoundingBox, CommandDetector, Detection, Detector, SharedDetector};
pub use pipeline::{Pipeline, PipelineConfig, PipelineResult};
pub use watermark::{BrandRegistry, WatermarkAsset};
