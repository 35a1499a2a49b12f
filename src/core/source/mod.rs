//! # Source Module
//!
//! Validates submitted batches and turns each photo's source into bytes.
//!
//! ## Sources
//! - **Inline** - `data:image/<type>;base64,<payload>` strings, decoded locally
//! - **Remote** - `http(s)://` URLs, retrieved through an `ImageFetcher`
//!
//! Loading failures are per-image: the caller records them and moves on
//! to the next photo.

mod fetch;
mod inline;
mod intake;
mod scratch;

pub use fetch::{is_retryable, HttpFetcher, ImageFetcher};
pub use inline::{decode_inline, encode_data_url};
pub use intake::{BatchRequest, ImageRecord, PhotoDescriptor, PhotoSource, ValidatedBatch};
pub use scratch::ScratchSpace;

use crate::core::pipeline::CancellationToken;
use crate::error::ImageError;

/// A record whose bytes were retrieved, with the size they occupied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub record: ImageRecord,
    pub byte_size: u64,
}

/// Retrieve a record's bytes, staging them in `scratch` when given.
///
/// Returns the loaded record alongside the raw encoded bytes. `cancel` is
/// handed to the fetcher for remote sources.
pub fn load_record(
    record: &ImageRecord,
    fetcher: &dyn ImageFetcher,
    scratch: Option<&ScratchSpace>,
    cancel: &CancellationToken,
) -> Result<(LoadedImage, Vec<u8>), ImageError> {
    let bytes = match &record.source {
        PhotoSource::Inline { data, .. } => decode_inline(data)?,
        PhotoSource::Remote { url } => fetcher.fetch(url, cancel)?,
    };

    let byte_size = match scratch {
        Some(scratch) => scratch
            .stage(record.index, &bytes)
            .map_err(|e| ImageError::Staging(e.to_string()))?,
        None => bytes.len() as u64,
    };

    Ok((
        LoadedImage {
            record: record.clone(),
            byte_size,
        },
        bytes,
    ))
}
