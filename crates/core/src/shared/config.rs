use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for one grouping run.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub scale: f64,
    pub max_keypoints: usize,
    pub fast_threshold: f32,
    pub fast_n: usize,
    pub n_scales: usize,
    pub downscale: f64,
    pub harris_k: f32,
    /// Hamming distance above which a mutual match is discarded.
    pub max_distance: Option<u32>,
    pub overlap_threshold: usize,
    pub max_trials: usize,
    pub residual_threshold: f64,
    pub seed: u64,
    pub history_limit: Option<usize>,
    pub read_ahead: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            max_keypoints: DEFAULT_MAX_KEYPOINTS,
            fast_threshold: DEFAULT_FAST_THRESHOLD,
            fast_n: DEFAULT_FAST_N,
            n_scales: DEFAULT_N_SCALES,
            downscale: DEFAULT_DOWNSCALE,
            harris_k: DEFAULT_HARRIS_K,
            max_distance: None,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            max_trials: DEFAULT_MAX_TRIALS,
            residual_threshold: DEFAULT_RESIDUAL_THRESHOLD,
            seed: DEFAULT_RANSAC_SEED,
            history_limit: None,
            read_ahead: DEFAULT_READ_AHEAD,
        }
    }
}

impl GroupingConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(invalid(format!(
                "scale must be in (0.0, 1.0], got {}",
                self.scale
            )));
        }
        if self.max_keypoints == 0 {
            return Err(invalid("max_keypoints must be positive".to_string()));
        }
        if !(self.fast_threshold > 0.0 && self.fast_threshold < 1.0) {
            return Err(invalid(format!(
                "fast_threshold must be in (0.0, 1.0), got {}",
                self.fast_threshold
            )));
        }
        if !(9..=16).contains(&self.fast_n) {
            return Err(invalid(format!(
                "fast_n must be between 9 and 16, got {}",
                self.fast_n
            )));
        }
        if self.n_scales == 0 {
            return Err(invalid("n_scales must be positive".to_string()));
        }
        if self.downscale <= 1.0 {
            return Err(invalid(format!(
                "downscale must be greater than 1.0, got {}",
                self.downscale
            )));
        }
        if self.max_trials == 0 {
            return Err(invalid("max_trials must be positive".to_string()));
        }
        if self.residual_threshold <= 0.0 {
            return Err(invalid(format!(
                "residual_threshold must be positive, got {}",
                self.residual_threshold
            )));
        }
        if self.history_limit == Some(0) {
            return Err(invalid("history_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}
