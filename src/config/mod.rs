//! # Config Module
//!
//! Pipeline configuration, loaded from JSON or built in code.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "threshold": 10, "workers": 4, "fetch": { "timeout_secs": 5 } }
//! ```

use crate::core::comparator::DEFAULT_THRESHOLD;
use crate::core::hasher::{HashAlgorithmKind, ResampleFilter, FINGERPRINT_BITS};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "photo-dedup";
const CONFIG_FILE: &str = "config.json";

/// Settings for one `Pipeline`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum Hamming distance for two photos to be linked
    pub threshold: u32,
    /// Fingerprint algorithm
    pub algorithm: HashAlgorithmKind,
    /// Resampling filter used before hashing
    pub filter: ResampleFilter,
    /// Worker threads for per-image work
    pub workers: usize,
    /// Batches smaller than this are hashed on the calling thread
    pub parallel_min_batch: usize,
    /// Write loaded bytes to a request-scoped scratch directory
    pub stage_to_disk: bool,
    /// Parent of scratch directories (system temp dir when unset)
    pub scratch_root: Option<PathBuf>,
    /// Largest accepted batch
    pub max_batch_size: usize,
    pub fetch: FetchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            algorithm: HashAlgorithmKind::default(),
            filter: ResampleFilter::default(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            parallel_min_batch: 4,
            stage_to_disk: false,
            scratch_root: None,
            max_batch_size: 500,
            fetch: FetchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the platform config directory, falling back to defaults
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// `<config dir>/photo-dedup/config.json`, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold > FINGERPRINT_BITS {
            return Err(ConfigError::InvalidThreshold {
                value: self.threshold,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

/// Remote fetch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure
    pub retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    pub retry_backoff_ms: u64,
    /// Responses larger than this are rejected
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retries: 2,
            retry_backoff_ms: 250,
            max_bytes: 25 * 1024 * 1024,
            user_agent: format!("photo-dedup/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
