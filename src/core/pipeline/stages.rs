//! Per-file tasks run by the batch scheduler.

use crate::core::batch::{ItemStatus, TaskError, WorkItem};
use crate::core::censor::{censor_image, CensorConfig};
use crate::core::codec;
use crate::core::detector::SharedDetector;
use crate::core::optimize::optimize;
use crate::core::resize::FastResizer;
use crate::core::watermark::{apply_watermark, WatermarkAsset};
use std::fs;
use std::path::Path;

/// Settings for the optimize and watermark task
#[derive(Debug, Clone, Copy)]
pub struct WatermarkSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
    pub opacity: f32,
}

/// Censor one file into `item.output`.
///
/// An unreadable source is a skip. Detection and encode errors are failures.
/// With `copy_unchanged`, a file needing no censoring is copied byte for byte
/// instead of re-encoded.
pub fn censor_one(
    item: &WorkItem,
    detector: &SharedDetector,
    config: &CensorConfig,
    copy_unchanged: bool,
) -> Result<ItemStatus, TaskError> {
    let image = codec::decode_oriented(&item.input).map_err(TaskError::skip)?;
    let detections = detector.detect(&item.input).map_err(TaskError::fail)?;

    let output = censor_image(image, &detections, config);
    if !output.touched() {
        if copy_unchanged {
            fs::copy(&item.input, &item.output).map_err(TaskError::fail)?;
            return Ok(ItemStatus::Copied);
        }
        codec::write_image(&output.image, &item.output).map_err(TaskError::fail)?;
        return Ok(ItemStatus::Unchanged);
    }

    codec::write_image(&output.image, &item.output).map_err(TaskError::fail)?;
    Ok(ItemStatus::Censored {
        regions: output.regions.len(),
    })
}

/// Downscale one file, re-encode it, then brand it into `item.output`.
///
/// The optimized JPEG goes through a scratch file in the output directory
/// so the overlay is drawn on the re-compressed pixels. The scratch file is
/// removed whether or not the item succeeds.
pub fn watermark_one(
    item: &WorkItem,
    asset: &WatermarkAsset,
    settings: &WatermarkSettings,
) -> Result<ItemStatus, TaskError> {
    let image = codec::decode_oriented(&item.input).map_err(TaskError::skip)?;

    let mut resizer = FastResizer::new();
    let optimized = optimize(&mut resizer, &image, settings.max_width, settings.max_height)
        .map_err(TaskError::fail)?;
    drop(image);

    let scratch_dir = item.output.parent().unwrap_or(Path::new("."));
    let scratch = tempfile::Builder::new()
        .prefix("tmp_")
        .suffix(".jpg")
        .tempfile_in(scratch_dir)
        .map_err(TaskError::fail)?;

    codec::encode_jpeg(&optimized, scratch.path(), settings.quality).map_err(TaskError::fail)?;
    let recompressed = codec::decode(scratch.path()).map_err(TaskError::fail)?;

    let branded = apply_watermark(&mut resizer, &recompressed, asset, settings.opacity)
        .map_err(TaskError::fail)?;
    codec::encode_jpeg(&branded, &item.output, settings.quality).map_err(TaskError::fail)?;

    Ok(ItemStatus::Watermarked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detector::{BoundingBox, Detection, Detector};
    use crate::error::DetectionError;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    struct FixedDetector(Vec<Detection>);

    impl Detector for FixedDetector {
        fn detect(&mut self, _path: &Path) -> Result<Vec<Detection>, DetectionError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenDetector;

    impl Detector for BrokenDetector {
        fn detect(&mut self, path: &Path) -> Result<Vec<Detection>, DetectionError> {
            Err(DetectionError::Failed {
                path: path.to_path_buf(),
                reason: "model crashed".to_string(),
            })
        }
    }

    fn checkerboard(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn detector(detections: Vec<Detection>) -> SharedDetector {
        SharedDetector::from_detector(Box::new(FixedDetector(detections)))
    }

    fn config() -> CensorConfig {
        let mut config = CensorConfig::new(["FEMALE_BREAST_EXPOSED"]);
        config.kernel_size = 15;
        config.padding = 4;
        config
    }

    #[test]
    fn censors_matching_detection() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.png");
        checkerboard(64, 48).save(&input).unwrap();
        let item = WorkItem::new(&input, temp.path().join("out.png"));

        let detector = detector(vec![Detection::new(
            "FEMALE_BREAST_EXPOSED",
            BoundingBox::new(10, 10, 20, 20),
        )]);
        let status = censor_one(&item, &detector, &config(), false).unwrap();

        assert_eq!(status, ItemStatus::Censored { regions: 1 });
        let written = image::open(&item.output).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (64, 48));
        assert_ne!(written.get_pixel(20, 20), checkerboard(64, 48).get_pixel(20, 20));
    }

    #[test]
    fn unmatched_image_is_still_written() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.png");
        checkerboard(32, 32).save(&input).unwrap();
        let item = WorkItem::new(&input, temp.path().join("out.png"));

        let detector = detector(vec![Detection::new("FACE_FEMALE", BoundingBox::new(0, 0, 10, 10))]);
        let status = censor_one(&item, &detector, &config(), false).unwrap();

        assert_eq!(status, ItemStatus::Unchanged);
        assert_eq!(image::open(&item.output).unwrap().to_rgb8(), checkerboard(32, 32));
    }

    #[test]
    fn unmatched_image_can_be_copied() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.png");
        checkerboard(16, 16).save(&input).unwrap();
        let item = WorkItem::new(&input, temp.path().join("out.png"));

        let status = censor_one(&item, &detector(Vec::new()), &config(), true).unwrap();

        assert_eq!(status, ItemStatus::Copied);
        assert_eq!(fs::read(&input).unwrap(), fs::read(&item.output).unwrap());
    }

    #[test]
    fn corrupt_source_is_skipped() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("bad.jpg");
        fs::write(&input, b"definitely not a jpeg").unwrap();
        let item = WorkItem::new(&input, temp.path().join("out.jpg"));

        let result = censor_one(&item, &detector(Vec::new()), &config(), false);
        assert!(matches!(result, Err(TaskError::Skip(_))));
        assert!(!item.output.exists());
    }

    #[test]
    fn detector_failure_fails_item() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.png");
        checkerboard(16, 16).save(&input).unwrap();
        let item = WorkItem::new(&input, temp.path().join("out.png"));

        let detector = SharedDetector::from_detector(Box::new(BrokenDetector));
        let result = censor_one(&item, &detector, &config(), false);
        match result {
            Err(TaskError::Fail(message)) => assert!(message.contains("model crashed")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn watermark_writes_jpeg_and_cleans_scratch() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.png");
        checkerboard(200, 100).save(&input).unwrap();
        let out_dir = temp.path().join("WATERMARK_DEMO");
        fs::create_dir(&out_dir).unwrap();
        let item = WorkItem::new(&input, out_dir.join("CENSORED_1.jpg"));

        let overlay = RgbaImage::from_pixel(10, 5, Rgba([255, 0, 0, 255]));
        let asset = WatermarkAsset::new("TEST", overlay.clone(), overlay);
        let settings = WatermarkSettings {
            max_width: 100,
            max_height: 100,
            quality: 80,
            opacity: 0.7,
        };

        let status = watermark_one(&item, &asset, &settings).unwrap();
        assert_eq!(status, ItemStatus::Watermarked);

        let written = image::open(&item.output).unwrap();
        assert_eq!((written.width(), written.height()), (100, 50));

        let leftovers: Vec<_> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("tmp_"))
            .collect();
        assert!(leftovers.is_empty(), "scratch files left: {leftovers:?}");
    }
}
