//! # Hasher Module
//!
//! Turns one decoded image into a 64-bit perceptual fingerprint.
//!
//! ## Supported Algorithms
//! - **pHash (Perceptual Hash)** - Default; DCT low frequencies, robust to
//!   re-encoding, resizing and compression noise
//! - **dHash (Difference Hash)** - Cheaper gradient-based alternative
//!
//! ## How It Works
//! 1. Normalize to a fixed square resolution with a deterministic filter
//! 2. Convert to grayscale
//! 3. Derive one bit per retained feature in a fixed order
//! 4. Compare fingerprints using Hamming distance
//!
//! Extraction is a pure function of the pixels: the same decoded image
//! always yields the same fingerprint.
//!
//! ## Example
//! ```rust,ignore
//! use photo_dedup_engine::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Perceptual)
//!     .build();
//!
//! let fingerprint = hasher.hash_image(&image)?;
//! ```

mod algorithms;
pub mod fast_decode;
pub mod fast_resize;
mod traits;

pub use algorithms::{DifferenceHasher, PerceptualHasher, BLOCK_SIZE, SAMPLE_SIZE};
pub use fast_decode::FastDecoder;
pub use fast_resize::ResampleFilter;
pub use traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind, FINGERPRINT_BITS};

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Algorithm to use
    algorithm: HashAlgorithmKind,
    /// Filter used for the normalization resample
    filter: ResampleFilter,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults (pHash, Lanczos3)
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Perceptual,
            filter: ResampleFilter::Lanczos3,
        }
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Box<dyn HashAlgorithm> {
        match self.algorithm {
            HashAlgorithmKind::Perceptual => Box::new(PerceptualHasher::new(self.filter)),
            HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new(self.filter)),
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}
