//! # Censor Module
//!
//! Detection-driven region censoring.
//!
//! ## Algorithm
//! 1. Keep detections whose label is in the wanted set
//! 2. Pad each box, clamp it to the image, drop empty boxes ([`CensorRegion`])
//! 3. Gaussian-blur the box contents with a square kernel of exactly
//!    `kernel_size` taps (sigma from OpenCV's zero-sigma rule, mirrored edges)
//! 4. Copy blurred pixels back inside a circle centred on the box; the rest
//!    of the box keeps its current pixels
//!
//! Regions are applied in detection order on the same buffer, so a later
//! region blurs whatever an earlier one left behind inside its own box.
//!
//! An image with no wanted detections comes back untouched. Callers still
//! write it out: every input gets an output file.

mod blur;
mod engine;
mod region;

pub use blur::{gaussian_blur, gaussian_weights};

pub use engine::{censor_image, CensorOutput};
pub use region::{CensorRegion, Rect};

use std::collections::HashSet;

/// Default blur kernel side in pixels
pub const DEFAULT_KERNEL_SIZE: u32 = 151;
/// Default padding added around each detection box
pub const DEFAULT_PADDING: u32 = 60;
/// Default circle radius scale
pub const DEFAULT_CIRCLE_SCALE: f32 = 1.0;

/// Parameters for censoring one image
#[derive(Debug, Clone)]
pub struct CensorConfig {
    /// Labels to censor
    pub labels: HashSet<String>,
    /// Gaussian kernel side; normalized with [`normalize_kernel`] before use
    pub kernel_size: u32,
    /// Padding added on every side of a detection box
    pub padding: u32,
    /// Multiplier on the inscribed circle radius
    pub circle_scale: f32,
}

impl CensorConfig {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            kernel_size: DEFAULT_KERNEL_SIZE,
            padding: DEFAULT_PADDING,
            circle_scale: DEFAULT_CIRCLE_SCALE,
        }
    }

    /// Kernel side actually used for blurring
    pub fn effective_kernel(&self) -> u32 {
        normalize_kernel(self.kernel_size)
    }

    pub fn wants(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// Round a kernel size up to the nearest odd value of at least 3.
pub fn normalize_kernel(kernel_size: u32) -> u32 {
    let kernel = kernel_size.max(3);
    if kernel % 2 == 0 {
        kernel + 1
    } else {
        kernel
    }
}

/// Gaussian sigma for a kernel side, using the same rule OpenCV applies when
/// sigma is left at zero.
pub fn kernel_sigma(kernel_size: u32) -> f32 {
    let k = normalize_kernel(kernel_size) as f32;
    0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_always_odd_and_at_least_three() {
        for k in 0..400 {
            let normalized = normalize_kernel(k);
            assert!(normalized >= 3, "kernel {k} -> {normalized}");
            assert_eq!(normalized % 2, 1, "kernel {k} -> {normalized}");
        }
    }

    #[test]
    fn even_kernel_rounds_up_by_one() {
        assert_eq!(normalize_kernel(150), 151);
        assert_eq!(normalize_kernel(151), 151);
        assert_eq!(normalize_kernel(4), 5);
        assert_eq!(normalize_kernel(1), 3);
    }

    #[test]
    fn sigma_matches_opencv_rule() {
        assert!((kernel_sigma(151) - 23.0).abs() < 1e-4);
        assert!((kernel_sigma(3) - 0.8).abs() < 1e-4);
    }

    #[test]
    fn config_defaults() {
        let config = CensorConfig::new(["FEMALE_BREAST_EXPOSED"]);
        assert_eq!(config.kernel_size, 151);
        assert_eq!(config.padding, 60);
        assert!(config.wants("FEMALE_BREAST_EXPOSED"));
        assert!(!config.wants("FACE_FEMALE"));
    }
}
