//! # Scanner Module
//!
//! Lists the image files a stage will process.
//!
//! Both stages work on a single flat directory: sub-directories are not
//! descended into, and the listing is sorted by file name so enumeration
//! order (and therefore the watermark stage's sequence numbers) is stable.
//!
//! ## Extension sets
//! - Censor stage: `jpg`, `jpeg`, `png`
//! - Watermark stage: the above plus `webp`, `bmp`, `tiff`, `tif`, `gif`

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{list_images, ScanConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions accepted by the censoring stage
pub const CENSOR_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extensions accepted by the optimize + watermark stage
pub const WATERMARK_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif"];

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the file
    pub path: PathBuf,
    /// File name, used for output naming and progress messages
    pub name: String,
    /// Container format derived from the extension
    pub format: ImageFormat,
}

/// Container formats the pipeline can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            "gif" => ImageFormat::Gif,
            "bmp" => ImageFormat::Bmp,
            "tiff" | "tif" => ImageFormat::Tiff,
            _ => ImageFormat::Unknown,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }

    /// The `image` crate format used to encode output of this container
    pub fn encoder_format(&self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            ImageFormat::Unknown => None,
        }
    }

    /// Whether the container can store an alpha channel
    pub fn supports_alpha(&self) -> bool {
        matches!(
            self,
            ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif | ImageFormat::Tiff
        )
    }
}
