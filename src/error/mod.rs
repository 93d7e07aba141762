//! # Error Module
//!
//! Error types for the censoring pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Fatal vs per-file** - configuration and output-directory errors stop a
//!   run; detection and image errors are recorded against a single file

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CensorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Run was cancelled")]
    Cancelled,
}

/// Invalid run parameters, detected before any file is touched
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown watermark brand: {name}")]
    UnknownBrand { name: String },

    #[error("Invalid {name}: {value} ({expected})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Censoring requires a detector but none was configured")]
    NoDetector,

    #[error("Watermark asset not found for brand {brand}: {path}")]
    MissingAsset { brand: String, path: PathBuf },

    #[error("Failed to read brand file {path}: {reason}")]
    BrandFile { path: PathBuf, reason: String },
}

/// Errors raised by the detector adapter
#[derive(Error, Debug, Clone)]
pub enum DetectionError {
    #[error("Detector is unavailable: {0}")]
    Unavailable(String),

    #[error("Detector failed on {path}: {reason}")]
    Failed { path: PathBuf, reason: String },

    #[error("Could not parse detector output for {path}: {reason}")]
    InvalidOutput { path: PathBuf, reason: String },
}

/// Per-file image errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to resize image: {reason}")]
    Resize { reason: String },

    #[error("Unsupported output format for {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Image is empty: {path}")]
    Empty { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the sampling copy stage
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("Sampling interval must be at least 1")]
    InvalidInterval,

    #[error("Sample source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sampling produced no files from {path}")]
    Empty { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CensorError>;
