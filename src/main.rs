//! # photo-dedup CLI
//!
//! Command-line interface for the photo dedup engine.
//!
//! ## Usage
//! ```bash
//! photo-dedup dedup request.json --threshold 15
//! photo-dedup dedup request.json --output json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    photo_dedup_engine::init_tracing();
    cli::run()
}
