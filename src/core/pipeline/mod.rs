//! # Pipeline Module
//!
//! Orchestrates a full censoring run.
//!
//! ## Pipeline Stages
//! 1. **Sample** (optional) - copy every Nth photo into a sibling folder
//! 2. **Censor** - blur wanted detections in every JPEG/PNG into `CENSORED`
//! 3. **Watermark** (when a brand is set) - downscale, re-encode and brand
//!    every censored file into `WATERMARK_DEMO` as `CENSORED_{n}.jpg`
//!
//! Output folders are created next to the folder being processed.
//!
//! ## Parallelism
//! Each stage runs on a [`BatchScheduler`](crate::core::batch::BatchScheduler)
//! with the configured worker count. Configuration problems surface from
//! [`PipelineBuilder::build`]; per-file problems end up in the stage summaries.

mod executor;
mod paths;
mod stages;

pub use executor::{
    Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, SamplingConfig, DEFAULT_SAMPLE_DIR,
};
pub use paths::{
    censored_dir, watermark_dir, watermark_file_name, OutputLayout, CENSORED_DIR_NAME,
    WATERMARK_DIR_NAME,
};
pub use stages::{censor_one, watermark_one, WatermarkSettings};
