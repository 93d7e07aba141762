//! Pipeline execution implementation.

use super::paths::{folder_name, normalize, watermark_file_name, OutputLayout};
use super::stages::{censor_one, watermark_one, WatermarkSettings};
use crate::core::batch::{default_workers, BatchScheduler, BatchSummary, CancellationToken, WorkItem};
use crate::core::censor::{CensorConfig, DEFAULT_CIRCLE_SCALE, DEFAULT_KERNEL_SIZE, DEFAULT_PADDING};
use crate::core::detector::{Detector, SharedDetector, DEFAULT_LABELS};
use crate::core::optimize::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY};
use crate::core::sample::{IntervalSampler, Sampler};
use crate::core::scanner::{list_images, ScanConfig, CENSOR_EXTENSIONS, WATERMARK_EXTENSIONS};
use crate::core::watermark::{BrandRegistry, WatermarkAsset, DEFAULT_OPACITY};
use crate::error::{CensorError, ConfigError, DetectionError};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, Stage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Default name of the sampling destination folder
pub const DEFAULT_SAMPLE_DIR: &str = "third_photos";

/// Optional sampling copy before censoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Keep every `interval`-th image
    pub interval: usize,
    /// Folder created next to the input to hold the sample
    pub dest_name: String,
}

impl SamplingConfig {
    pub fn every(interval: usize) -> Self {
        Self {
            interval,
            dest_name: DEFAULT_SAMPLE_DIR.to_string(),
        }
    }
}

/// Configuration for one run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder to process
    pub input: PathBuf,
    /// Detector labels to censor
    pub labels: Vec<String>,
    /// Blur kernel side (rounded up to odd, at least 3)
    pub kernel_size: u32,
    /// Padding around each detection box
    pub padding: u32,
    /// Circle radius multiplier
    pub circle_scale: f32,
    /// Brand to watermark with; `None` skips the watermark stage
    pub watermark_brand: Option<String>,
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality for the watermark stage
    pub quality: u8,
    /// Overlay opacity
    pub opacity: f32,
    /// Concurrent items per stage
    pub workers: usize,
    pub sampling: Option<SamplingConfig>,
    /// Copy files with nothing to censor instead of re-encoding them
    pub copy_unchanged: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            kernel_size: DEFAULT_KERNEL_SIZE,
            padding: DEFAULT_PADDING,
            circle_scale: DEFAULT_CIRCLE_SCALE,
            watermark_brand: None,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            opacity: DEFAULT_OPACITY,
            workers: default_workers(),
            sampling: None,
            copy_unchanged: false,
        }
    }
}

impl PipelineConfig {
    /// Check every parameter range. Nothing on disk is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(name: &'static str, value: impl ToString, expected: &'static str) -> ConfigError {
            ConfigError::InvalidParameter {
                name,
                value: value.to_string(),
                expected,
            }
        }

        if !(1..=100).contains(&self.quality) {
            return Err(invalid("quality", self.quality, "1-100"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid("opacity", self.opacity, "0.0-1.0"));
        }
        if !self.circle_scale.is_finite() || self.circle_scale <= 0.0 {
            return Err(invalid("circle_scale", self.circle_scale, "greater than 0"));
        }
        if self.max_width == 0 {
            return Err(invalid("max_width", self.max_width, "at least 1"));
        }
        if self.max_height == 0 {
            return Err(invalid("max_height", self.max_height, "at least 1"));
        }
        if self.workers == 0 {
            return Err(invalid("workers", self.workers, "at least 1"));
        }
        if let Some(sampling) = &self.sampling {
            if sampling.interval == 0 {
                return Err(invalid("sample interval", sampling.interval, "at least 1"));
            }
            if sampling.dest_name.trim().is_empty() {
                return Err(invalid("sample destination", "\"\"", "a folder name"));
            }
        }
        Ok(())
    }

    fn censor_config(&self) -> CensorConfig {
        let mut config = CensorConfig::new(self.labels.iter().cloned());
        config.kernel_size = self.kernel_size;
        config.padding = self.padding;
        config.circle_scale = self.circle_scale;
        config
    }

    fn watermark_settings(&self) -> WatermarkSettings {
        WatermarkSettings {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
            opacity: self.opacity,
        }
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Folder the censor stage read (the sample folder when sampling ran)
    pub input_used: PathBuf,
    /// Sample folder, when sampling ran
    pub sampled_dir: Option<PathBuf>,
    pub censored_dir: PathBuf,
    /// Watermark output folder, when the watermark stage ran
    pub watermarked_dir: Option<PathBuf>,
    pub censor: BatchSummary,
    pub watermark: Option<BatchSummary>,
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Total failed items across both stages
    pub fn failed(&self) -> usize {
        self.censor.failed + self.watermark.as_ref().map_or(0, |w| w.failed)
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    brands: BrandRegistry,
    detector: Option<Arc<SharedDetector>>,
    sampler: Option<Box<dyn Sampler>>,
    cancel: CancellationToken,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            brands: BrandRegistry::new(),
            detector: None,
            sampler: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Folder to process
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.config.input = input.into();
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Labels to censor
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn kernel_size(mut self, kernel_size: u32) -> Self {
        self.config.kernel_size = kernel_size;
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.config.padding = padding;
        self
    }

    pub fn circle_scale(mut self, scale: f32) -> Self {
        self.config.circle_scale = scale;
        self
    }

    /// Brand for the watermark stage; `None` disables it
    pub fn watermark_brand(mut self, brand: Option<String>) -> Self {
        self.config.watermark_brand = brand;
        self
    }

    /// Brand name to overlay file registry
    pub fn brands(mut self, brands: BrandRegistry) -> Self {
        self.brands = brands;
        self
    }

    pub fn max_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.config.max_width = max_width;
        self.config.max_height = max_height;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.config.opacity = opacity;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Copy every `interval`-th image into a sibling folder first
    pub fn sampling(mut self, sampling: Option<SamplingConfig>) -> Self {
        self.config.sampling = sampling;
        self
    }

    /// Use a custom sampling strategy instead of [`IntervalSampler`]
    pub fn sampler(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn copy_unchanged(mut self, copy: bool) -> Self {
        self.config.copy_unchanged = copy;
        self
    }

    /// Shared detector used by every censor worker
    pub fn detector(mut self, detector: Arc<SharedDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Build the detector lazily on the first file
    pub fn detector_factory<F>(self, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Detector>, DetectionError> + Send + Sync + 'static,
    {
        self.detector(Arc::new(SharedDetector::new(factory)))
    }

    /// Token the caller can use to stop the run between items
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Validate the configuration, resolve the brand, and load its overlays.
    ///
    /// No input file is read here, so a bad brand fails before any work.
    pub fn build(self) -> Result<Pipeline, CensorError> {
        self.config.validate()?;

        let detector = self.detector.ok_or(ConfigError::NoDetector)?;

        let watermark = match &self.config.watermark_brand {
            Some(brand) => {
                let assets = self.brands.lookup(brand)?;
                Some(Arc::new(WatermarkAsset::load(brand, assets)?))
            }
            None => None,
        };

        let sampler = match (&self.config.sampling, self.sampler) {
            (Some(_), Some(custom)) => Some(custom),
            (Some(sampling), None) => {
                Some(Box::new(IntervalSampler::new(sampling.interval)?) as Box<dyn Sampler>)
            }
            (None, _) => None,
        };

        Ok(Pipeline {
            config: self.config,
            detector,
            watermark,
            sampler,
            cancel: self.cancel,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The censoring pipeline
pub struct Pipeline {
    config: PipelineConfig,
    detector: Arc<SharedDetector>,
    watermark: Option<Arc<WatermarkAsset>>,
    sampler: Option<Box<dyn Sampler>>,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle for cancelling this pipeline from another thread
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, CensorError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, CensorError> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(events);
        match &result {
            Ok(result) if result.cancelled => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
            }
            Ok(result) => {
                events.send(Event::Pipeline(PipelineEvent::Completed {
                    censored: result.censor.succeeded,
                    watermarked: result.watermark.as_ref().map(|w| w.succeeded),
                    duration_ms: result.duration_ms,
                }));
            }
            Err(CensorError::Cancelled) => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
            }
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
            }
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult, CensorError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start_time = Instant::now();

        let source = normalize(&self.config.input);
        if !source.is_dir() {
            return Err(CensorError::InputNotFound { path: source });
        }
        info!(%run_id, input = %source.display(), "pipeline started");

        // Stage 0: optional sampling
        let mut sampled_dir = None;
        if let (Some(sampler), Some(sampling)) = (&self.sampler, &self.config.sampling) {
            events.send(Event::Pipeline(PipelineEvent::StageChanged {
                stage: Stage::Sample,
            }));
            sampled_dir = Some(sampler.sample(&source, &sampling.dest_name)?);
        }

        if self.cancel.is_cancelled() {
            return Err(CensorError::Cancelled);
        }

        let input_used = sampled_dir.clone().unwrap_or(source);
        let layout = OutputLayout::for_input(&input_used);

        // Stage 1: censoring
        events.send(Event::Pipeline(PipelineEvent::StageChanged {
            stage: Stage::Censor,
        }));
        let censor = self.censor_stage(&layout, events)?;

        let mut result = PipelineResult {
            run_id,
            started_at,
            input_used: layout.input.clone(),
            sampled_dir,
            censored_dir: layout.censored.clone(),
            watermarked_dir: None,
            censor,
            watermark: None,
            cancelled: false,
            duration_ms: 0,
        };

        if result.censor.was_cancelled() {
            warn!(%run_id, "pipeline cancelled during censoring");
            result.cancelled = true;
            result.duration_ms = start_time.elapsed().as_millis() as u64;
            return Ok(result);
        }

        // Stage 2: optimize and watermark
        if let Some(asset) = &self.watermark {
            events.send(Event::Pipeline(PipelineEvent::StageChanged {
                stage: Stage::Watermark,
            }));
            let summary = self.watermark_stage(&layout, asset, events)?;
            result.cancelled = summary.was_cancelled();
            result.watermarked_dir = Some(layout.watermarked.clone());
            result.watermark = Some(summary);
        }

        result.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            %run_id,
            censored = result.censor.succeeded,
            failed = result.failed(),
            duration_ms = result.duration_ms,
            "pipeline finished"
        );

        Ok(result)
    }

    fn censor_stage(&self, layout: &OutputLayout, events: &EventSender) -> Result<BatchSummary, CensorError> {
        let images = list_images(&layout.input, &ScanConfig::for_extensions(CENSOR_EXTENSIONS))?;
        create_output_dir(&layout.censored)?;

        let items: Vec<WorkItem> = images
            .into_iter()
            .map(|image| {
                let output = layout.censored.join(&image.name);
                WorkItem::new(image.path, output)
            })
            .collect();

        let config = self.config.censor_config();
        let detector = &self.detector;
        let copy_unchanged = self.config.copy_unchanged;

        self.scheduler(Stage::Censor, events)?.run(
            items,
            layout.input.clone(),
            layout.censored.clone(),
            |item| censor_one(item, detector, &config, copy_unchanged),
        )
    }

    fn watermark_stage(
        &self,
        layout: &OutputLayout,
        asset: &WatermarkAsset,
        events: &EventSender,
    ) -> Result<BatchSummary, CensorError> {
        let images = list_images(&layout.censored, &ScanConfig::for_extensions(WATERMARK_EXTENSIONS))?;
        create_output_dir(&layout.watermarked)?;

        let folder = folder_name(&layout.censored);
        let items: Vec<WorkItem> = images
            .into_iter()
            .enumerate()
            .map(|(i, image)| {
                let output = layout.watermarked.join(watermark_file_name(&folder, i + 1));
                WorkItem::new(image.path, output)
            })
            .collect();

        let settings = self.config.watermark_settings();

        self.scheduler(Stage::Watermark, events)?.run(
            items,
            layout.censored.clone(),
            layout.watermarked.clone(),
            |item| watermark_one(item, asset, &settings),
        )
    }

    fn scheduler(&self, stage: Stage, events: &EventSender) -> Result<BatchScheduler, CensorError> {
        Ok(BatchScheduler::new(stage, self.config.workers)?
            .with_events(events.clone())
            .with_cancellation(self.cancel.clone()))
    }
}

fn create_output_dir(path: &Path) -> Result<(), CensorError> {
    fs::create_dir_all(path).map_err(|e| CensorError::OutputDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}
