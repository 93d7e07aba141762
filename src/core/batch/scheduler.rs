//! Worker pool scheduler.

use super::{BatchSummary, CancellationToken, ItemOutcome, ItemStatus, Outcome, TaskError, WorkItem};
use crate::error::{CensorError, ConfigError};
use crate::events::{BatchEvent, Event, EventSender, Stage, null_sender};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Number of processing units on this host (at least 1)
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Runs a task over work items on a bounded pool
pub struct BatchScheduler {
    stage: Stage,
    workers: usize,
    cancel: CancellationToken,
    events: EventSender,
}

impl BatchScheduler {
    /// Scheduler for `stage` with `workers` threads
    pub fn new(stage: Stage, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "workers",
                value: workers.to_string(),
                expected: "at least 1",
            });
        }

        Ok(Self {
            stage,
            workers,
            cancel: CancellationToken::new(),
            events: null_sender(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Run `task` over `items` without a progress callback
    pub fn run<F>(
        &self,
        items: Vec<WorkItem>,
        input_dir: PathBuf,
        output_dir: PathBuf,
        task: F,
    ) -> Result<BatchSummary, CensorError>
    where
        F: Fn(&WorkItem) -> Result<ItemStatus, TaskError> + Sync,
    {
        self.run_with_progress(items, input_dir, output_dir, task, |_, _, _| {})
    }

    /// Run `task` over `items`, calling `on_progress(completed, total, name)`
    /// once with `completed = 0`, once per finished item, and once at the end
    /// with `completed = total`.
    ///
    /// Only pool construction can fail; task failures are recorded in the
    /// summary.
    pub fn run_with_progress<F, P>(
        &self,
        items: Vec<WorkItem>,
        input_dir: PathBuf,
        output_dir: PathBuf,
        task: F,
        on_progress: P,
    ) -> Result<BatchSummary, CensorError>
    where
        F: Fn(&WorkItem) -> Result<ItemStatus, TaskError> + Sync,
        P: Fn(usize, usize, Option<&str>) + Sync,
    {
        let start_time = Instant::now();
        let total = items.len();
        let stage = self.stage;

        info!(%stage, total, workers = self.workers, "batch started");
        self.events.send(Event::Batch(BatchEvent::Started { stage, total }));
        on_progress(0, total, None);
        self.events.progress(stage, 0, total, None);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers.min(total.max(1)))
            .thread_name(move |i| format!("{}-worker-{}", stage, i).to_lowercase())
            .build()
            .map_err(|e| CensorError::WorkerPool(e.to_string()))?;

        let next = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        let finished: Mutex<Vec<(usize, Outcome)>> = Mutex::new(Vec::with_capacity(total));

        let worker = || loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let index = next.fetch_add(1, Ordering::SeqCst);
            let Some(item) = items.get(index) else {
                break;
            };

            let outcome = run_item(&task, item);
            if let Some(message) = outcome.message() {
                warn!(%stage, file = %item.name, "{}", message);
                self.events.send(Event::Batch(BatchEvent::ItemFailed {
                    path: item.input.clone(),
                    message: message.to_string(),
                }));
            } else {
                debug!(%stage, file = %item.name, "item done");
            }

            if let Ok(mut finished) = finished.lock() {
                finished.push((index, outcome));
            }

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            on_progress(done, total, Some(&item.name));
            self.events.progress(stage, done, total, Some(item.name.clone()));
        };

        pool.scope(|scope| {
            for _ in 0..pool.current_num_threads() {
                scope.spawn(|_| worker());
            }
        });

        let mut slots: Vec<Option<Outcome>> = vec![None; total];
        let finished = finished
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (index, outcome) in finished {
            slots[index] = Some(outcome);
        }

        let outcomes: Vec<ItemOutcome> = items
            .into_iter()
            .zip(slots)
            .map(|(item, outcome)| ItemOutcome {
                item,
                outcome: outcome.unwrap_or(Outcome::Cancelled),
            })
            .collect();

        on_progress(total, total, None);
        self.events.progress(stage, total, total, None);

        let summary = BatchSummary::from_outcomes(
            stage,
            input_dir,
            output_dir,
            outcomes,
            start_time.elapsed().as_millis() as u64,
        );

        self.events.send(Event::Batch(BatchEvent::Completed {
            stage,
            succeeded: summary.succeeded,
            failed: summary.failed,
        }));
        info!(
            %stage,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "batch finished"
        );

        Ok(summary)
    }
}

/// Run one task, turning errors and panics into an outcome
fn run_item<F>(task: &F, item: &WorkItem) -> Outcome
where
    F: Fn(&WorkItem) -> Result<ItemStatus, TaskError> + Sync,
{
    match panic::catch_unwind(AssertUnwindSafe(|| task(item))) {
        Ok(Ok(status)) => Outcome::Succeeded(status),
        Ok(Err(TaskError::Skip(reason))) => Outcome::Skipped {
            message: format!("Skip {}: {}", item.name, reason),
        },
        Ok(Err(TaskError::Fail(reason))) => Outcome::Failed {
            message: format!("Error {}: {}", item.name, reason),
        },
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "task panicked".to_string());
            Outcome::Failed {
                message: format!("Error {}: {}", item.name, reason),
            }
        }
    }
}
