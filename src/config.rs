//! Engine configuration
//!
//! Only the options declared on [`TunerConfig`] are recognized; unknown keys in
//! a YAML file are rejected rather than ignored.
//!
//! # Example
//!
//! ```
//! use afinar::TunerConfig;
//!
//! let config = TunerConfig::from_yaml_str("persist_every_observation: false\nseed: 7\n")?;
//! assert!(!config.persist_every_observation);
//! assert_eq!(config.observation_batch_size, 16);
//! # Ok::<(), afinar::TuneError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TuneError};

/// Which direction of the objective counts as an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetterDirection {
    #[default]
    Maximize,
    Minimize,
}

impl BetterDirection {
    /// True if `a` is strictly better than `b`
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            BetterDirection::Maximize => a > b,
            BetterDirection::Minimize => a < b,
        }
    }

    /// `+1.0` when maximizing, `-1.0` when minimizing
    pub fn sign(self) -> f64 {
        match self {
            BetterDirection::Maximize => 1.0,
            BetterDirection::Minimize => -1.0,
        }
    }
}

/// Recognized engine options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunerConfig {
    /// Emit lifecycle events to an external telemetry sink
    pub external_logging_enabled: bool,
    /// JSON-lines telemetry target used when logging is enabled
    pub telemetry_path: Option<PathBuf>,
    /// Commit every resolution before `observe()` returns
    pub persist_every_observation: bool,
    /// Queue length that triggers a commit when not persisting every observation
    pub observation_batch_size: usize,
    /// Replay the existing store on open; `false` clears it
    pub resume: bool,
    pub better_direction: BetterDirection,
    /// Base seed of the default proposer
    pub seed: u64,
    /// Successes required before proposals leave the search center
    pub num_random_samples: usize,
    /// Proposal standard deviation in normalized units
    pub initial_search_radius: f64,
    /// Allow observations without a row id to bind by parameter values
    pub match_observations_by_value: bool,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            external_logging_enabled: false,
            telemetry_path: None,
            persist_every_observation: true,
            observation_batch_size: 16,
            resume: true,
            better_direction: BetterDirection::Maximize,
            seed: 0,
            num_random_samples: 4,
            initial_search_radius: 0.3,
            match_observations_by_value: true,
        }
    }
}

impl TunerConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: TunerConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TuneError::invalid_config("yaml", format!("Failed to parse YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|e| {
            TuneError::invalid_config(
                "path",
                format!("Failed to read config file {}: {e}", path.display()),
            )
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.observation_batch_size == 0 {
            return Err(TuneError::invalid_config("observation_batch_size", "must be at least 1"));
        }
        if !(self.initial_search_radius.is_finite() && self.initial_search_radius > 0.0) {
            return Err(TuneError::invalid_config(
                "initial_search_radius",
                format!("must be positive and finite, got {}", self.initial_search_radius),
            ));
        }
        if self.telemetry_path.is_some() && !self.external_logging_enabled {
            return Err(TuneError::invalid_config(
                "telemetry_path",
                "set external_logging_enabled: true to use a telemetry file",
            ));
        }
        Ok(())
    }
}
