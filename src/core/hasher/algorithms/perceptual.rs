//! Perceptual Hash (pHash) implementation.
//!
//! pHash works by:
//! 1. Converting to luma and resampling to 32x32
//! 2. Running a 2-D DCT-II (rows, then columns)
//! 3. Keeping the top-left 8x8 block of low frequencies
//! 4. Setting each bit when its coefficient is at or above the median
//!    of the block's 63 AC coefficients
//!
//! The DC coefficient only tracks overall brightness, so it is kept out of
//! the median. Low frequencies survive re-encoding, rescaling and
//! compression noise while still separating distinct scenes.

use super::super::fast_resize::{resize_to_grayscale, ResampleFilter};
use super::super::traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};
use crate::error::HashError;
use image::DynamicImage;
use rustdct::{DctPlanner, TransformType2And3};
use std::sync::Arc;

/// Side of the normalized square image
pub const SAMPLE_SIZE: usize = 32;

/// Side of the retained low-frequency block
pub const BLOCK_SIZE: usize = 8;

/// Perceptual Hash (pHash) implementation using DCT
pub struct PerceptualHasher {
    filter: ResampleFilter,
    dct: Arc<dyn TransformType2And3<f64>>,
}

impl PerceptualHasher {
    /// Create a new pHash hasher
    pub fn new(filter: ResampleFilter) -> Self {
        let mut planner = DctPlanner::new();
        let dct = planner.plan_dct2(SAMPLE_SIZE);
        Self { filter, dct }
    }

    /// Low-frequency 8x8 block of the 2-D DCT, row-major
    fn low_frequencies(&self, samples: &[u8]) -> [f64; BLOCK_SIZE * BLOCK_SIZE] {
        let mut rows: Vec<f64> = samples.iter().map(|&p| p as f64).collect();
        for row in rows.chunks_exact_mut(SAMPLE_SIZE) {
            self.dct.process_dct2(row);
        }

        // Only the first BLOCK_SIZE columns feed the retained block
        let mut block = [0.0; BLOCK_SIZE * BLOCK_SIZE];
        let mut column = vec![0.0; SAMPLE_SIZE];
        for x in 0..BLOCK_SIZE {
            for (y, value) in column.iter_mut().enumerate() {
                *value = rows[y * SAMPLE_SIZE + x];
            }
            self.dct.process_dct2(&mut column);
            for y in 0..BLOCK_SIZE {
                block[y * BLOCK_SIZE + x] = column[y];
            }
        }
        block
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(ResampleFilter::default())
    }
}

/// Median of the AC coefficients (everything but index 0)
fn ac_median(block: &[f64; BLOCK_SIZE * BLOCK_SIZE]) -> f64 {
    let mut ac: Vec<f64> = block[1..].to_vec();
    ac.sort_by(|a, b| a.total_cmp(b));
    ac[ac.len() / 2]
}

impl HashAlgorithm for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let size = SAMPLE_SIZE as u32;
        let gray = resize_to_grayscale(image, size, size, self.filter)?;

        let block = self.low_frequencies(gray.as_raw());
        let median = ac_median(&block);

        let bits = block
            .iter()
            .fold(0u64, |acc, &coefficient| (acc << 1) | u64::from(coefficient >= median));

        Ok(Fingerprint::from_bits(bits))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Perceptual
    }
}
