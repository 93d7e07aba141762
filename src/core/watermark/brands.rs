//! Watermark brand registry.
//!
//! A brand file is a JSON object mapping brand names to overlay paths:
//!
//! ```json
//! {
//!   "MIDNIGHT": { "portrait": "/brands/midnight_port.png", "landscape": "/brands/midnight_land.png" }
//! }
//! ```
//!
//! Relative paths are resolved against the brand file's directory.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Overlay files for one brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandAssets {
    #[serde(alias = "port")]
    pub portrait: PathBuf,
    #[serde(alias = "land")]
    pub landscape: PathBuf,
}

/// Known brands, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandRegistry {
    brands: BTreeMap<String, BrandAssets>,
}

impl BrandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a brand
    pub fn insert(&mut self, name: impl Into<String>, assets: BrandAssets) {
        self.brands.insert(name.into(), assets);
    }

    pub fn with_brand(mut self, name: impl Into<String>, portrait: impl Into<PathBuf>, landscape: impl Into<PathBuf>) -> Self {
        self.insert(
            name,
            BrandAssets {
                portrait: portrait.into(),
                landscape: landscape.into(),
            },
        );
        self
    }

    /// Look up a brand by exact name
    pub fn lookup(&self, name: &str) -> Result<&BrandAssets, ConfigError> {
        self.brands.get(name).ok_or_else(|| ConfigError::UnknownBrand {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    /// Load a registry from a JSON brand file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let brand_file_error = |reason: String| ConfigError::BrandFile {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| brand_file_error(e.to_string()))?;
        let mut registry: BrandRegistry =
            serde_json::from_str(&contents).map_err(|e| brand_file_error(e.to_string()))?;

        if let Some(base) = path.parent() {
            for assets in registry.brands.values_mut() {
                assets.portrait = resolve(base, &assets.portrait);
                assets.landscape = resolve(base, &assets.landscape);
            }
        }

        Ok(registry)
    }

    /// Load the per-user brand file if it exists, otherwise an empty registry
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::new()),
        }
    }

    /// `<config dir>/photo-censor/brands.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photo-censor").join("brands.json"))
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Interpret a brand argument: empty or `none` (any case) disables the
/// watermark stage.
pub fn parse_brand(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
