//! Trait definitions for comparison strategies.

use crate::core::hasher::FINGERPRINT_BITS;
use crate::error::ConfigError;

/// Threshold used when nothing else is configured.
///
/// Up to 15 of 64 bits may differ, which merges visually similar photos as
/// well as identical ones.
pub const DEFAULT_THRESHOLD: u32 = 15;

/// Strategy trait for deciding whether two fingerprints are adjacent
pub trait ComparisonStrategy: Send + Sync {
    /// Determine if two photos should be linked based on distance
    fn is_duplicate(&self, distance: u32) -> bool;

    /// Get the threshold used
    fn threshold(&self) -> u32;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Simple threshold-based comparison strategy
///
/// The threshold counts bit positions, not a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdStrategy {
    /// Maximum distance to consider adjacent (inclusive)
    threshold: u32,
}

impl ThresholdStrategy {
    /// Create a threshold strategy, rejecting values beyond the fingerprint width
    pub fn new(threshold: u32) -> Result<Self, ConfigError> {
        if threshold > FINGERPRINT_BITS {
            return Err(ConfigError::InvalidThreshold { value: threshold });
        }
        Ok(Self { threshold })
    }

}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_duplicate(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: photos with distance <= {} of {} bits are linked",
            self.threshold, FINGERPRINT_BITS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let strategy = ThresholdStrategy::new(5).unwrap();

        assert!(strategy.is_duplicate(4));
        assert!(strategy.is_duplicate(5));
        assert!(!strategy.is_duplicate(6));
    }

    #[test]
    fn threshold_above_fingerprint_width_is_rejected() {
        assert!(ThresholdStrategy::new(64).is_ok());
        assert!(matches!(
            ThresholdStrategy::new(65),
            Err(ConfigError::InvalidThreshold { value: 65 })
        ));
    }

    #[test]
    fn default_links_up_to_fifteen_bits() {
        let strategy = ThresholdStrategy::default();
        assert_eq!(strategy.threshold(), DEFAULT_THRESHOLD);
        assert!(strategy.is_duplicate(15));
        assert!(!strategy.is_duplicate(16));
    }

    #[test]
    fn description_includes_threshold() {
        let strategy = ThresholdStrategy::new(7).unwrap();
        assert!(strategy.description().contains("<= 7"));
    }
}
