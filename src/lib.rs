//! # Photo Dedup Engine
//!
//! Finds near-duplicate photos in a submitted batch.
//!
//! ## Core Philosophy
//! - **Never touch the photos** - the engine reports groups, callers decide
//! - **One bad photo never sinks a batch** - load and decode failures are
//!   recorded and the rest of the batch carries on
//! - **Deterministic output** - the same batch always yields the same groups
//!
//! ## Architecture
//! - `core` - The duplicate detection engine
//! - `config` - Pipeline configuration
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::{FetchConfig, PipelineConfig};
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`). Calling this
/// more than once is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
