//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the censoring pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Batch scheduler events (one batch per stage)
    Batch(BatchEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events emitted while a batch of files is processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// A batch has started
    Started { stage: Stage, total: usize },
    /// Progress update; sent once with `completed = 0` and once per finished item
    Progress(BatchProgress),
    /// A single file failed but the batch continues
    ItemFailed { path: PathBuf, message: String },
    /// The batch finished
    Completed {
        stage: Stage,
        succeeded: usize,
        failed: usize,
    },
}

/// Progress information for a running batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Stage this batch belongs to
    pub stage: Stage,
    /// Number of items finished so far
    pub completed: usize,
    /// Total number of items in the batch
    pub total: usize,
    /// File name of the item that just finished, if any
    pub current: Option<String>,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new stage
    StageChanged { stage: Stage },
    /// Pipeline completed
    Completed {
        censored: usize,
        watermarked: Option<usize>,
        duration_ms: u64,
    },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Stages of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Sample,
    Censor,
    Watermark,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Sample => write!(f, "Sampling"),
            Stage::Censor => write!(f, "Censoring"),
            Stage::Watermark => write!(f, "Watermarking"),
        }
    }
}
