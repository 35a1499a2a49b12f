//! # Error Module
//!
//! Error types for the batch duplicate finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Per-image failures stay per-image** - `FetchError` and `DecodeError`
//!   are collected into the batch summary, they never abort siblings
//! - **Request-level failures are classified** - callers can tell invalid
//!   input apart from an internal failure

use thiserror::Error;

/// Top-level error for a dedup run
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Invalid request: {0}")]
    Input(#[from] InputError),

    #[error("No valid images to process ({failed} of {total} failed to load)")]
    NoValidImages { total: usize, failed: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dedup run was cancelled")]
    Cancelled,

    #[error("Internal pipeline failure: {0}")]
    Pipeline(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DedupError {
    /// Whether the caller sent something we could not work with (4xx class)
    pub fn is_client_error(&self) -> bool {
        matches!(self, DedupError::Input(_) | DedupError::NoValidImages { .. })
    }
}

/// Errors in the submitted batch, detected before any pipeline work
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Empty photos list")]
    EmptyBatch,

    #[error("Too many photos: {count} (limit is {limit})")]
    TooManyPhotos { count: usize, limit: usize },

    #[error("Photo {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Photo {index} has an unsupported source (expected a data:image URL or http(s) URL)")]
    UnsupportedSource { index: usize },

    #[error("Malformed request body: {0}")]
    Malformed(String),
}

/// Errors retrieving a remote image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Fetch of {url} was cancelled")]
    Cancelled { url: String },
}

/// Errors turning bytes into pixels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Image data is empty")]
    Empty,

    #[error("Inline image data is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Failed to decode image: {0}")]
    Corrupt(String),

    #[error("Image has zero width or height")]
    ZeroSized,
}

/// Internal faults while fingerprinting an already-decoded image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid resize dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Resize failed: {0}")]
    ResizeFailed(String),
}

impl From<HashError> for DedupError {
    fn from(error: HashError) -> Self {
        DedupError::Pipeline(error.to_string())
    }
}

/// A single image that could not be loaded, decoded or staged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to stage image bytes: {0}")]
    Staging(String),
}

/// Errors in pipeline configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid threshold: {value} (must be 0-64)")]
    InvalidThreshold { value: u32 },

    #[error("Worker count must be at least 1")]
    NoWorkers,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
