//! Wire responses for a dedup run.
//!
//! The body shapes are fixed: a report is `{groups, others}`, everything
//! else is `{error}`. The HTTP-class status code travels alongside so a
//! transport layer can branch on it without inspecting the body.

use super::{DedupOutcome, DedupReport, DedupRun};
use crate::error::DedupError;
use serde::Serialize;

/// Body sent when the batch was valid but contained no duplicates
pub const NO_DUPLICATES_MESSAGE: &str = "No similar photos found";

/// Which of the four response classes this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Duplicates,
    NoDuplicates,
    InvalidInput,
    InternalError,
}

impl ResponseKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ResponseKind::Duplicates => 200,
            ResponseKind::NoDuplicates => 404,
            ResponseKind::InvalidInput => 400,
            ResponseKind::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Report(DedupReport),
    Error { error: String },
}

/// A classified response ready to serialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupResponse {
    kind: ResponseKind,
    body: ResponseBody,
}

impl DedupResponse {
    /// Response for a successful run
    pub fn from_outcome(outcome: &DedupOutcome) -> Self {
        match outcome {
            DedupOutcome::Duplicates(report) => Self {
                kind: ResponseKind::Duplicates,
                body: ResponseBody::Report(report.clone()),
            },
            DedupOutcome::NoDuplicates { .. } => Self {
                kind: ResponseKind::NoDuplicates,
                body: ResponseBody::Error {
                    error: NO_DUPLICATES_MESSAGE.to_string(),
                },
            },
        }
    }

    /// Response for a failed run.
    ///
    /// Internal failures carry the error message; input problems carry a
    /// description of what was wrong with the request.
    pub fn from_error(error: &DedupError) -> Self {
        let kind = if error.is_client_error() {
            ResponseKind::InvalidInput
        } else {
            ResponseKind::InternalError
        };

        let message = match error {
            DedupError::NoValidImages { .. } => "No valid images to process".to_string(),
            other => other.to_string(),
        };

        Self {
            kind,
            body: ResponseBody::Error { error: message },
        }
    }

    pub fn from_result(result: &Result<DedupRun, DedupError>) -> Self {
        match result {
            Ok(run) => Self::from_outcome(&run.outcome),
            Err(error) => Self::from_error(error),
        }
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Compact JSON body
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }

    /// Indented JSON body
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::{PhotoEntry, PhotoGroup};
    use crate::error::InputError;

    fn entry(name: &str) -> PhotoEntry {
        PhotoEntry {
            src: format!("https://photos.example/{}", name),
            name: name.to_string(),
            size: 64,
        }
    }

    #[test]
    fn duplicates_are_200_with_report_body() {
        let outcome = DedupOutcome::Duplicates(DedupReport {
            groups: vec![PhotoGroup {
                photos: vec![entry("a.jpg"), entry("b.jpg")],
            }],
            others: vec![entry("c.jpg")],
        });

        let response = DedupResponse::from_outcome(&outcome);
        let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(json["groups"][0]["photos"][0]["name"], "a.jpg");
        assert_eq!(json["others"][0]["name"], "c.jpg");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn no_duplicates_is_404_not_an_error_class() {
        let outcome = DedupOutcome::NoDuplicates {
            others: vec![entry("a.jpg")],
        };

        let response = DedupResponse::from_outcome(&outcome);

        assert_eq!(response.kind(), ResponseKind::NoDuplicates);
        assert_eq!(response.status_code(), 404);
        assert_eq!(
            response.to_json().unwrap(),
            r#"{"error":"No similar photos found"}"#
        );
    }

    #[test]
    fn input_errors_are_400() {
        let response = DedupResponse::from_error(&DedupError::from(InputError::EmptyBatch));
        assert_eq!(response.status_code(), 400);

        let response = DedupResponse::from_error(&DedupError::NoValidImages { total: 3, failed: 3 });
        assert_eq!(response.status_code(), 400);
        assert_eq!(
            response.body(),
            &ResponseBody::Error {
                error: "No valid images to process".to_string()
            }
        );
    }

    #[test]
    fn internal_failures_are_500() {
        let response = DedupResponse::from_error(&DedupError::Pipeline("worker died".to_string()));
        assert_eq!(response.status_code(), 500);

        let response = DedupResponse::from_error(&DedupError::Cancelled);
        assert_eq!(response.kind(), ResponseKind::InternalError);
    }
}
