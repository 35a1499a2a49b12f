//! Difference Hash (dHash) implementation.
//!
//! dHash works by:
//! 1. Resampling the luma image to 9x8
//! 2. Comparing each pixel to the one to its right
//! 3. If left pixel is brighter, set bit to 1, else 0
//!
//! 8 rows of 8 comparisons give exactly 64 bits.

use super::super::fast_resize::{resize_to_grayscale, ResampleFilter};
use super::super::traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};
use crate::error::HashError;
use image::DynamicImage;

const GRID: u32 = 8;

/// Difference Hash (dHash) implementation
pub struct DifferenceHasher {
    filter: ResampleFilter,
}

impl DifferenceHasher {
    /// Create a new dHash hasher
    pub fn new(filter: ResampleFilter) -> Self {
        Self { filter }
    }
}

impl Default for DifferenceHasher {
    fn default() -> Self {
        Self::new(ResampleFilter::default())
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        // One extra column so every cell has a right-hand neighbour
        let gray = resize_to_grayscale(image, GRID + 1, GRID, self.filter)?;

        let mut bits = 0u64;
        for y in 0..GRID {
            for x in 0..GRID {
                let left = gray.get_pixel(x, y)[0];
                let right = gray.get_pixel(x + 1, y)[0];
                bits = (bits << 1) | u64::from(left > right);
            }
        }

        Ok(Fingerprint::from_bits(bits))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }
}
