//! # Sample Module
//!
//! Optional stage that copies a subset of a folder into a sibling folder so
//! the rest of the run works on the subset.
//!
//! [`IntervalSampler`] keeps every Nth image by name order (the Nth, the
//! 2Nth, and so on). Other strategies plug in through [`Sampler`].

use crate::core::scanner::{list_images, ScanConfig, CENSOR_EXTENSIONS};
use crate::error::{CensorError, SampleError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Copies a selection of images from `source` into a new directory
pub trait Sampler: Send + Sync {
    /// Populate the destination and return its path.
    ///
    /// `dest_name` is the folder name; the folder is created next to
    /// `source`.
    fn sample(&self, source: &Path, dest_name: &str) -> Result<PathBuf, CensorError>;
}

/// Keep every `interval`-th image
#[derive(Debug, Clone)]
pub struct IntervalSampler {
    interval: usize,
}

impl IntervalSampler {
    pub fn new(interval: usize) -> Result<Self, SampleError> {
        if interval == 0 {
            return Err(SampleError::InvalidInterval);
        }
        Ok(Self { interval })
    }

    /// Indices (0-based) picked out of `count` sorted files
    pub fn picks(&self, count: usize) -> impl Iterator<Item = usize> {
        (self.interval - 1..count).step_by(self.interval)
    }
}

impl Sampler for IntervalSampler {
    fn sample(&self, source: &Path, dest_name: &str) -> Result<PathBuf, CensorError> {
        if !source.is_dir() {
            return Err(SampleError::SourceNotFound {
                path: source.to_path_buf(),
            }
            .into());
        }

        let images = list_images(source, &ScanConfig::for_extensions(CENSOR_EXTENSIONS))?;
        let parent = source.parent().unwrap_or(source);
        let dest = parent.join(dest_name);

        let picked: Vec<_> = self.picks(images.len()).map(|i| &images[i]).collect();
        if picked.is_empty() {
            return Err(SampleError::Empty {
                path: source.to_path_buf(),
            }
            .into());
        }

        fs::create_dir_all(&dest).map_err(|e| CensorError::OutputDirectory {
            path: dest.clone(),
            source: e,
        })?;

        for image in &picked {
            let target = dest.join(&image.name);
            fs::copy(&image.path, &target).map_err(|e| SampleError::Copy {
                path: image.path.clone(),
                source: e,
            })?;
            debug!(file = %image.name, "sampled");
        }

        info!(
            source = %source.display(),
            dest = %dest.display(),
            copied = picked.len(),
            interval = self.interval,
            "sampling complete"
        );

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn folder_with(names: &[&str]) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("shoot");
        fs::create_dir(&source).unwrap();
        for name in names {
            fs::write(source.join(name), b"not really an image").unwrap();
        }
        (temp, source)
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            IntervalSampler::new(0),
            Err(SampleError::InvalidInterval)
        ));
    }

    #[test]
    fn picks_every_nth() {
        let sampler = IntervalSampler::new(3).unwrap();
        let picks: Vec<_> = sampler.picks(10).collect();
        assert_eq!(picks, vec![2, 5, 8]);

        let every = IntervalSampler::new(1).unwrap();
        assert_eq!(every.picks(3).count(), 3);
    }

    #[test]
    fn copies_into_sibling_folder() {
        let names: Vec<String> = (1..=7).map(|i| format!("img_{i}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (temp, source) = folder_with(&refs);
        fs::write(source.join("notes.txt"), b"skip me").unwrap();

        let sampler = IntervalSampler::new(3).unwrap();
        let dest = sampler.sample(&source, "third_photos").unwrap();

        assert_eq!(dest, temp.path().join("third_photos"));
        let mut copied: Vec<_> = fs::read_dir(&dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        copied.sort();
        assert_eq!(copied, vec!["img_3.jpg", "img_6.jpg"]);
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let sampler = IntervalSampler::new(2).unwrap();
        let result = sampler.sample(&temp.path().join("absent"), "out");
        assert!(matches!(
            result,
            Err(CensorError::Sample(SampleError::SourceNotFound { .. }))
        ));
    }

    #[test]
    fn too_few_files_is_an_error() {
        let (_temp, source) = folder_with(&["a.jpg"]);
        let sampler = IntervalSampler::new(5).unwrap();
        assert!(matches!(
            sampler.sample(&source, "out"),
            Err(CensorError::Sample(SampleError::Empty { .. }))
        ));
    }
}
