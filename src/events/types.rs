//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All events emitted by the dedup pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Per-image load, decode and fingerprint events
    Hash(HashEvent),
    /// Pairwise comparison events
    Compare(CompareEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the fingerprinting phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Fingerprinting has started
    Started { total_photos: usize },
    /// Progress update during fingerprinting
    Progress(HashProgress),
    /// One image could not be loaded or decoded; the batch continues
    Error {
        index: usize,
        name: String,
        message: String,
    },
    /// Fingerprinting completed
    Completed { total_hashed: usize, failed: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of images finished so far (hashed or failed)
    pub completed: usize,
    /// Total number of images in the batch
    pub total: usize,
    /// Batch index of the image that just finished
    pub index: usize,
}

/// Events during the comparison phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// Comparison has started
    Started { total_photos: usize },
    /// Progress update during comparison
    Progress(CompareProgress),
    /// Comparison completed
    Completed { total_edges: usize },
}

/// Progress information during comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareProgress {
    /// Number of comparisons completed
    pub comparisons_completed: usize,
    /// Total number of comparisons needed
    pub total_comparisons: usize,
    /// Number of edges found so far
    pub edges_found: usize,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started on a validated batch
    Started { request_id: Uuid, total_photos: usize },
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Hashing,
    Comparing,
    Grouping,
    Reporting,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Photos in the request
    pub total_photos: usize,
    /// Photos that produced a fingerprint
    pub hashed_photos: usize,
    /// Photos dropped because they could not be loaded or decoded
    pub failed_photos: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Number of photos that matched nothing
    pub unmatched_photos: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}
