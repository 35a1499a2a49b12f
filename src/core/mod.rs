//! # Core Module
//!
//! The transport-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `source` - Validates batches and loads photo bytes
//! - `hasher` - Decodes images and computes perceptual fingerprints
//! - `comparator` - Links similar fingerprints and assembles clusters
//! - `reporter` - Maps clusters back to caller metadata
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod hasher;
pub mod pipeline;
pub mod reporter;
pub mod source;

// Re-export commonly used types
pub use comparator::Clustering;
pub use hasher::{Fingerprint, HashAlgorithmKind};
pub use pipeline::{CancellationToken, Pipeline};
pub use reporter::{DedupOutcome, DedupReport, DedupResponse, DedupRun, PhotoEntry, PhotoGroup};
pub use source::{BatchRequest, PhotoDescriptor};
