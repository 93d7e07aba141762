//! Flat directory listing using walkdir.

use super::{filter::ImageFilter, ImageFile, ImageFormat};
use crate::error::CensorError;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Configuration for a directory listing
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Extensions to include
    pub extensions: Vec<String>,
    /// Whether to include hidden files
    pub include_hidden: bool,
}

impl ScanConfig {
    /// Listing configuration for the given extension set
    pub fn for_extensions(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }
}

/// List the images directly inside `root`, sorted by file name.
///
/// Entries that cannot be read are logged and skipped. A missing or
/// non-directory root is an error.
pub fn list_images(root: &Path, config: &ScanConfig) -> Result<Vec<ImageFile>, CensorError> {
    if !root.is_dir() {
        return Err(CensorError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let extensions: Vec<&str> = config.extensions.iter().map(String::as_str).collect();
    let filter = ImageFilter::new(&extensions).with_hidden(config.include_hidden);

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut images = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !filter.should_include(entry.path()) {
            continue;
        }

        let path = entry.into_path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = ImageFormat::from_path(&path);

        images.push(ImageFile { path, name, format });
    }

    Ok(images)
}
