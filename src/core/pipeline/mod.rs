//! # Pipeline Module
//!
//! Orchestrates one dedup request from validation to response.
//!
//! ## Pipeline Stages
//! 1. **Hash** - Load, decode and fingerprint every photo
//! 2. **Compare** - Link photos whose fingerprints are within the threshold
//! 3. **Group** - Collect linked photos into connected components
//! 4. **Report** - Re-attach caller metadata to each group
//!
//! ## Parallelism
//! Hashing runs on a dedicated rayon pool. Comparison starts only after
//! every photo has either a fingerprint or a recorded failure.

mod executor;

pub use executor::{CancellationToken, Pipeline, PipelineBuilder};
