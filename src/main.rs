//! # photo-censor CLI
//!
//! Command-line interface for the batch censoring pipeline.
//!
//! ## Usage
//! ```bash
//! photo-censor run ~/Shoots/beach --detector-cmd nudenet-detect
//! photo-censor run ~/Shoots/beach --detector-cmd nudenet-detect --watermark MIDNIGHT --output json
//! photo-censor brands
//! ```

mod cli;

use photo_censor::Result;

fn main() -> Result<()> {
    cli::run()
}
