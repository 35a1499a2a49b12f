//! Fingerprint algorithm implementations.

mod difference;
mod perceptual;

pub use difference::DifferenceHasher;
pub use perceptual::{PerceptualHasher, BLOCK_SIZE, SAMPLE_SIZE};
