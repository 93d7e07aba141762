//! Work items, outcomes and summaries.

use crate::events::Stage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file to process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Display name, normally the input file name
    pub name: String,
}

impl WorkItem {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            input,
            output: output.into(),
            name,
        }
    }
}

/// What a successful task did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Regions were blurred and the result written
    Censored { regions: usize },
    /// Nothing to censor; the image was re-encoded as-is
    Unchanged,
    /// Nothing to censor; the source bytes were copied
    Copied,
    /// Optimized and watermarked
    Watermarked,
}

/// Why a task did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The input could not be read as an image
    Skip(String),
    /// Anything else that went wrong
    Fail(String),
}

impl TaskError {
    pub fn skip(reason: impl std::fmt::Display) -> Self {
        TaskError::Skip(reason.to_string())
    }

    pub fn fail(reason: impl std::fmt::Display) -> Self {
        TaskError::Fail(reason.to_string())
    }
}

/// Per-item result recorded by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Succeeded(ItemStatus),
    Skipped { message: String },
    Failed { message: String },
    /// Never started because the batch was cancelled
    Cancelled,
}

impl Outcome {
    /// Message for skipped and failed items
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Skipped { message } | Outcome::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// A work item paired with its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item: WorkItem,
    pub outcome: Outcome,
}

/// Aggregate result of one batch run.
///
/// `failed` counts every started item that did not succeed, skips included;
/// `skipped` is the subset that could not be decoded. Cancelled items are
/// counted separately and in neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub stage: Stage,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: usize,
    /// Messages of skipped and failed items, in submission order
    pub failures: Vec<String>,
    /// Outcomes in submission order
    pub outcomes: Vec<ItemOutcome>,
    pub duration_ms: u64,
}

impl BatchSummary {
    /// Tally outcomes into a summary
    pub fn from_outcomes(
        stage: Stage,
        input_dir: PathBuf,
        output_dir: PathBuf,
        outcomes: Vec<ItemOutcome>,
        duration_ms: u64,
    ) -> Self {
        let mut summary = Self {
            stage,
            input_dir,
            output_dir,
            total: outcomes.len(),
            succeeded: 0,
            failed: 0,
            skipped: 0,
            cancelled: 0,
            failures: Vec::new(),
            outcomes: Vec::new(),
            duration_ms,
        };

        for entry in &outcomes {
            match &entry.outcome {
                Outcome::Succeeded(_) => summary.succeeded += 1,
                Outcome::Skipped { message } => {
                    summary.failed += 1;
                    summary.skipped += 1;
                    summary.failures.push(message.clone());
                }
                Outcome::Failed { message } => {
                    summary.failed += 1;
                    summary.failures.push(message.clone());
                }
                Outcome::Cancelled => summary.cancelled += 1,
            }
        }

        summary.outcomes = outcomes;
        summary
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, outcome: Outcome) -> ItemOutcome {
        ItemOutcome {
            item: WorkItem::new(format!("/in/{name}"), format!("/out/{name}")),
            outcome,
        }
    }

    #[test]
    fn work_item_name_is_file_name() {
        let item = WorkItem::new("/photos/beach.jpg", "/CENSORED/beach.jpg");
        assert_eq!(item.name, "beach.jpg");
    }

    #[test]
    fn summary_counts_skips_as_failures() {
        let summary = BatchSummary::from_outcomes(
            Stage::Censor,
            PathBuf::from("/in"),
            PathBuf::from("/out"),
            vec![
                entry("a.jpg", Outcome::Succeeded(ItemStatus::Censored { regions: 2 })),
                entry("b.jpg", Outcome::Succeeded(ItemStatus::Unchanged)),
                entry("c.jpg", Outcome::Skipped { message: "Skip c.jpg".into() }),
                entry("d.jpg", Outcome::Failed { message: "Error d.jpg".into() }),
                entry("e.jpg", Outcome::Cancelled),
            ],
            12,
        );

        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.cancelled, 1);
        assert!(summary.was_cancelled());
        assert_eq!(summary.failures, vec!["Skip c.jpg", "Error d.jpg"]);
    }

    #[test]
    fn summary_is_serializable() {
        let summary = BatchSummary::from_outcomes(
            Stage::Watermark,
            PathBuf::from("/in"),
            PathBuf::from("/out"),
            vec![entry("a.jpg", Outcome::Succeeded(ItemStatus::Watermarked))],
            5,
        );
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"succeeded\":1"));
    }
}
