//! # Reporter Module
//!
//! Re-attaches caller metadata to clustered indices and shapes the result.
//!
//! Three outcomes have to stay distinguishable for callers:
//! 1. **Duplicates** - at least one group was found
//! 2. **No duplicates** - valid input, nothing to report (not an error)
//! 3. **Failure** - invalid input or an internal fault
//!
//! Nothing here touches the underlying photos; deleting or keeping them
//! is up to the caller.

mod mapper;
mod response;

pub use mapper::materialize;
pub use response::{DedupResponse, ResponseBody, ResponseKind, NO_DUPLICATES_MESSAGE};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One photo in the response, drawn from its originating record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// Source exactly as submitted
    pub src: String,
    /// Caller-supplied display name
    pub name: String,
    /// Size in bytes of the loaded image data
    pub size: u64,
}

/// A duplicate group of two or more photos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoGroup {
    pub photos: Vec<PhotoEntry>,
}

/// Groups plus the photos that matched nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupReport {
    pub groups: Vec<PhotoGroup>,
    pub others: Vec<PhotoEntry>,
}

/// What a successful run found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupOutcome {
    /// At least one duplicate group
    Duplicates(DedupReport),
    /// Every decodable photo was unique
    NoDuplicates { others: Vec<PhotoEntry> },
}

impl DedupOutcome {
    /// Classify a materialized report
    pub fn from_report(report: DedupReport) -> Self {
        if report.groups.is_empty() {
            DedupOutcome::NoDuplicates {
                others: report.others,
            }
        } else {
            DedupOutcome::Duplicates(report)
        }
    }

    /// Duplicate groups (empty for `NoDuplicates`)
    pub fn groups(&self) -> &[PhotoGroup] {
        match self {
            DedupOutcome::Duplicates(report) => &report.groups,
            DedupOutcome::NoDuplicates { .. } => &[],
        }
    }

    /// Photos that matched nothing
    pub fn others(&self) -> &[PhotoEntry] {
        match self {
            DedupOutcome::Duplicates(report) => &report.others,
            DedupOutcome::NoDuplicates { others } => others,
        }
    }

    pub fn has_duplicates(&self) -> bool {
        matches!(self, DedupOutcome::Duplicates(_))
    }
}

/// A photo excluded from the run, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFailure {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Batch-level diagnostics for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Photos in the request
    pub total: usize,
    /// Photos that produced a fingerprint
    pub hashed: usize,
    /// Photos dropped during load or decode, in batch order
    pub failures: Vec<ImageFailure>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Everything a successful run returns
#[derive(Debug, Clone)]
pub struct DedupRun {
    pub request_id: Uuid,
    pub outcome: DedupOutcome,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> PhotoEntry {
        PhotoEntry {
            src: format!("https://photos.example/{}", name),
            name: name.to_string(),
            size: 10,
        }
    }

    #[test]
    fn empty_groups_classify_as_no_duplicates() {
        let outcome = DedupOutcome::from_report(DedupReport {
            groups: Vec::new(),
            others: vec![entry("a.jpg")],
        });

        assert!(!outcome.has_duplicates());
        assert!(outcome.groups().is_empty());
        assert_eq!(outcome.others().len(), 1);
    }

    #[test]
    fn groups_classify_as_duplicates() {
        let outcome = DedupOutcome::from_report(DedupReport {
            groups: vec![PhotoGroup {
                photos: vec![entry("a.jpg"), entry("b.jpg")],
            }],
            others: Vec::new(),
        });

        assert!(outcome.has_duplicates());
        assert_eq!(outcome.groups()[0].photos.len(), 2);
    }

    #[test]
    fn report_serializes_in_wire_shape() {
        let report = DedupReport {
            groups: vec![PhotoGroup {
                photos: vec![entry("a.jpg"), entry("b.jpg")],
            }],
            others: vec![entry("c.jpg")],
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["groups"][0]["photos"][1]["name"], "b.jpg");
        assert_eq!(json["others"][0]["size"], 10);
    }
}
