//! Image encoding.

use crate::core::scanner::ImageFormat;
use crate::error::ImageError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JPEG quality used when the censor stage rewrites a JPEG source
pub const CENSOR_JPEG_QUALITY: u8 = 95;

/// Write `image` to `path` in the container named by the path's extension.
///
/// Formats that cannot hold alpha get the image flattened to RGB first.
pub fn write_image(image: &DynamicImage, path: &Path) -> Result<(), ImageError> {
    let format = ImageFormat::from_path(path);
    let encoder_format = format
        .encoder_format()
        .ok_or_else(|| ImageError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

    if format == ImageFormat::Jpeg {
        return encode_jpeg(&image.to_rgb8(), path, CENSOR_JPEG_QUALITY);
    }

    let encode_error = |e: image::ImageError| ImageError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if format.supports_alpha() {
        image.save_with_format(path, encoder_format).map_err(encode_error)
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
            .save_with_format(path, encoder_format)
            .map_err(encode_error)
    }
}

/// Encode an RGB buffer as JPEG at `quality` (clamped to 1-100).
pub fn encode_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), ImageError> {
    let file = File::create(path).map_err(|e| ImageError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(|e| ImageError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    writer.flush().map_err(|e| ImageError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
