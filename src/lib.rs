//! # Photo Censor
//!
//! Batch censoring of photo folders: find sensitive regions with a detector,
//! blur them, then optionally downscale and brand the results.
//!
//! ## Core Philosophy
//! - **Never touch the originals** - every stage writes to a new folder
//! - **One bad file never stops a run** - per-file outcomes, full summaries
//! - **Fail fast on configuration** - bad parameters or brands error before
//!   any image is read
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Detection, censoring, watermarking and the batch pipeline
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CensorError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// when set; otherwise `verbose` selects `debug` over `warn`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "photo_censor=debug" } else { "warn" }));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A subscriber may already be installed (tests, embedding apps)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
