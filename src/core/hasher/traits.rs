//! Trait definitions for perceptual fingerprints.

use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Number of bits in every fingerprint
pub const FINGERPRINT_BITS: u32 = 64;

/// A 64-bit perceptual fingerprint of one decoded image.
///
/// Bit 63 holds the first coefficient/comparison in the hasher's fixed
/// ordering, bit 0 the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap raw fingerprint bits
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw fingerprint bits
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance to another fingerprint
    ///
    /// Returns the number of bit positions that differ.
    /// Lower distance = more similar images.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Fixed-width lowercase hex rendering
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Available fingerprint algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithmKind {
    /// Perceptual Hash (pHash) - DCT-based, robust to re-encoding and resizing
    #[default]
    Perceptual,
    /// Difference Hash (dHash) - brightness gradients between neighbours
    Difference,
}

impl HashAlgorithmKind {
    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Perceptual => {
                "Perceptual Hash (pHash) - low-frequency DCT coefficients against their median"
            }
            HashAlgorithmKind::Difference => {
                "Difference Hash (dHash) - Compares brightness gradients between pixels"
            }
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
            HashAlgorithmKind::Difference => write!(f, "dHash"),
        }
    }
}

/// Trait for fingerprint algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute the fingerprint of an already-decoded image.
    ///
    /// The decoder guarantees non-empty dimensions, so an error here is an
    /// internal fault rather than bad input.
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let fp = Fingerprint::from_bits(0xFF00_AA55_0F0F_1234);
        assert_eq!(fp.distance(&fp), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Fingerprint::from_bits(0xFF00);
        let b = Fingerprint::from_bits(0x00FF_0001);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = Fingerprint::from_bits(u64::MAX);
        let b = Fingerprint::from_bits(0);
        assert_eq!(a.distance(&b), FINGERPRINT_BITS);
    }

    #[test]
    fn hex_is_fixed_width() {
        assert_eq!(Fingerprint::from_bits(0xBEEF).to_hex(), "000000000000beef");
        assert_eq!(Fingerprint::from_bits(0xBEEF).to_string().len(), 16);
    }

    #[test]
    fn algorithm_kind_display_and_serde() {
        assert_eq!(HashAlgorithmKind::Perceptual.to_string(), "pHash");
        assert_eq!(HashAlgorithmKind::Difference.to_string(), "dHash");
        let json = serde_json::to_string(&HashAlgorithmKind::Difference).unwrap();
        assert_eq!(json, "\"difference\"");
    }
}
