//! # Batch Module
//!
//! Bounded-concurrency execution of a per-file task over a list of files.
//!
//! ## Guarantees
//! - At most `workers` items run at once, on a dedicated rayon pool
//! - Items start in submission order; they may finish in any order
//! - A failing (or panicking) item becomes a failed [`Outcome`]; siblings
//!   keep running and the caller always gets a [`BatchSummary`]
//! - Cancellation is checked before each item starts, never mid-item

mod cancel;
mod scheduler;
mod types;

pub use cancel::CancellationToken;
pub use scheduler::{default_workers, BatchScheduler};
pub use types::{BatchSummary, ItemOutcome, ItemStatus, Outcome, TaskError, WorkItem};
