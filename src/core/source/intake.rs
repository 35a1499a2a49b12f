//! Request intake: the wire shape of a batch and its validation.

use crate::error::InputError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// One photo as submitted by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDescriptor {
    /// Inline `data:image/...;base64,` string or remote URL
    #[serde(default)]
    pub src: Option<String>,
    /// Display name echoed back in the response
    #[serde(default)]
    pub name: Option<String>,
}

impl PhotoDescriptor {
    /// Convenience constructor with both fields present
    pub fn new(src: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            name: Some(name.into()),
        }
    }
}

/// A batch as submitted by the caller, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub photos: Vec<PhotoDescriptor>,
}

impl BatchRequest {
    /// Create a request from descriptors
    pub fn new(photos: Vec<PhotoDescriptor>) -> Self {
        Self { photos }
    }

    /// Parse a JSON request body
    pub fn from_json(body: &str) -> Result<Self, InputError> {
        serde_json::from_str(body).map_err(|e| InputError::Malformed(e.to_string()))
    }

    /// Validate every descriptor before any pipeline work begins.
    ///
    /// Record indices are batch positions and stay stable for the request.
    pub fn validate(self, max_batch_size: usize) -> Result<ValidatedBatch, InputError> {
        if self.photos.is_empty() {
            return Err(InputError::EmptyBatch);
        }
        if self.photos.len() > max_batch_size {
            return Err(InputError::TooManyPhotos {
                count: self.photos.len(),
                limit: max_batch_size,
            });
        }

        let records = self
            .photos
            .into_iter()
            .enumerate()
            .map(|(index, photo)| {
                let src = photo
                    .src
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(InputError::MissingField { index, field: "src" })?;
                let name = photo
                    .name
                    .ok_or(InputError::MissingField { index, field: "name" })?;
                let source =
                    PhotoSource::parse(&src).ok_or(InputError::UnsupportedSource { index })?;

                Ok(ImageRecord {
                    index,
                    source,
                    display_name: name,
                    original_src: src,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        Ok(ValidatedBatch {
            request_id: Uuid::new_v4(),
            records,
        })
    }
}

/// Where an image's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    /// Base64 payload of a `data:image/<media_type>;base64,` URL
    Inline { media_type: String, data: String },
    /// Remote http(s) URL
    Remote { url: String },
}

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^data:image/([A-Za-z0-9.+-]+)[^,]*;base64,(.*)$")
            .expect("data URL pattern is valid")
    })
}

impl PhotoSource {
    /// Classify a `src` string, or `None` when it is neither form
    pub fn parse(src: &str) -> Option<Self> {
        let src = src.trim();

        if let Some(captures) = data_url_pattern().captures(src) {
            return Some(PhotoSource::Inline {
                media_type: captures[1].to_ascii_lowercase(),
                data: captures[2].to_string(),
            });
        }

        let lower = src.to_ascii_lowercase();
        let is_remote = ["http://", "https://"]
            .iter()
            .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len());
        is_remote.then(|| PhotoSource::Remote {
            url: src.to_string(),
        })
    }
}

/// An immutable, validated photo in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Batch position
    pub index: usize,
    /// Parsed source
    pub source: PhotoSource,
    /// Caller-supplied display name
    pub display_name: String,
    /// The `src` exactly as submitted, echoed back in the response
    pub original_src: String,
}

/// A batch that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    /// Identifier used in logs and scratch storage names
    pub request_id: Uuid,
    /// Records in batch order
    pub records: Vec<ImageRecord>,
}

impl ValidatedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
