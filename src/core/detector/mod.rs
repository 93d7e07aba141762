//! # Detector Module
//!
//! The boundary to the object-detection model.
//!
//! The pipeline never talks to a model directly. It holds a
//! [`SharedDetector`], which builds the real detector on first use through
//! a factory and serializes every call behind a mutex, so any
//! [`Detector`] implementation is safe to share between batch workers.
//!
//! ## Implementations
//! - [`CommandDetector`] - runs an external detection program and parses its
//!   JSON output
//! - tests use scripted detectors implementing the trait directly

mod command;
mod shared;

pub use command::CommandDetector;
pub use shared::{DetectorFactory, SharedDetector};

use crate::error::DetectionError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Labels censored when the caller does not choose their own
pub const DEFAULT_LABELS: &[&str] = &[
    "FEMALE_GENITALIA_EXPOSED",
    "MALE_GENITALIA_EXPOSED",
    "FEMALE_BREAST_EXPOSED",
    "ANUS_EXPOSED",
    "BUTTOCKS_EXPOSED",
    "ANUS_COVERED",
];

/// Axis-aligned rectangle in pixel coordinates.
///
/// Detector output may place boxes partly outside the image, so the origin is
/// signed. Clamping happens when a box becomes a censor region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl BoundingBox {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A model's claim that a labeled object occupies a box in one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub bbox: BoundingBox,
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            bbox,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// An object detector.
///
/// Implementations need not be thread-safe for concurrent calls:
/// [`SharedDetector`] serializes access. They must be `Send` so the shared
/// instance can live behind a mutex.
pub trait Detector: Send {
    /// Detect labeled objects in the image at `path`
    fn detect(&mut self, path: &Path) -> Result<Vec<Detection>, DetectionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_builder_sets_confidence() {
        let detection = Detection::new("FEMALE_BREAST_EXPOSED", BoundingBox::new(1, 2, 3, 4))
            .with_confidence(0.8);
        assert_eq!(detection.confidence, Some(0.8));
        assert_eq!(detection.bbox.width, 3);
    }

    #[test]
    fn six_default_labels() {
        assert_eq!(DEFAULT_LABELS.len(), 6);
        assert!(DEFAULT_LABELS.contains(&"ANUS_COVERED"));
    }
}
