//! Detector backed by an external detection program.
//!
//! The program is invoked as `<program> [args...] <image path>` and must print
//! a JSON array on stdout, one object per detection:
//!
//! ```json
//! [{"class": "FEMALE_BREAST_EXPOSED", "score": 0.91, "box": [100, 100, 200, 200]}]
//! ```
//!
//! `box` is `[x, y, width, height]` in pixels. This matches the output of
//! NudeNet's `detect`, so a thin wrapper script around it is enough.

use super::{BoundingBox, Detection, Detector};
use crate::error::DetectionError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Deserialize)]
struct RawDetection {
    #[serde(alias = "label")]
    class: String,
    #[serde(rename = "box")]
    bbox: [f64; 4],
    #[serde(default, alias = "confidence")]
    score: Option<f32>,
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        let [x, y, w, h] = raw.bbox.map(|v| v.round() as i64);
        Detection {
            label: raw.class,
            bbox: BoundingBox::new(x, y, w, h),
            confidence: raw.score,
        }
    }
}

/// Runs an external program per image
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandDetector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before the image path
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Parse the program's stdout into detections
    pub fn parse_output(path: &Path, stdout: &[u8]) -> Result<Vec<Detection>, DetectionError> {
        let raw: Vec<RawDetection> =
            serde_json::from_slice(stdout).map_err(|e| DetectionError::InvalidOutput {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(raw.into_iter().map(Detection::from).collect())
    }
}

impl Detector for CommandDetector {
    fn detect(&mut self, path: &Path) -> Result<Vec<Detection>, DetectionError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| {
                DetectionError::Unavailable(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DetectionError::Failed {
                path: path.to_path_buf(),
                reason: format!("{} exited with {}: {}", self.program.display(), output.status, stderr.trim()),
            });
        }

        Self::parse_output(path, &output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nudenet_style_output() {
        let stdout = br#"[
            {"class": "FEMALE_BREAST_EXPOSED", "score": 0.91, "box": [100, 100, 200, 200]},
            {"class": "FACE_FEMALE", "score": 0.5, "box": [10.4, 20.6, 30, 40]}
        ]"#;

        let detections = CommandDetector::parse_output(Path::new("a.jpg"), stdout).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "FEMALE_BREAST_EXPOSED");
        assert_eq!(detections[0].bbox, BoundingBox::new(100, 100, 200, 200));
        assert_eq!(detections[1].bbox, BoundingBox::new(10, 21, 30, 40));
        assert_eq!(detections[1].confidence, Some(0.5));
    }

    #[test]
    fn accepts_label_alias_without_score() {
        let stdout = br#"[{"label": "ANUS_COVERED", "box": [0, 0, 5, 5]}]"#;
        let detections = CommandDetector::parse_output(Path::new("a.jpg"), stdout).unwrap();
        assert_eq!(detections[0].label, "ANUS_COVERED");
        assert_eq!(detections[0].confidence, None);
    }

    #[test]
    fn malformed_output_is_an_error() {
        let error = CommandDetector::parse_output(Path::new("a.jpg"), b"not json").unwrap_err();
        assert!(matches!(error, DetectionError::InvalidOutput { .. }));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let mut detector = CommandDetector::new("/nonexistent/detector-binary-12345");
        let error = detector.detect(Path::new("a.jpg")).unwrap_err();
        assert!(matches!(error, DetectionError::Unavailable(_)));
    }
}
