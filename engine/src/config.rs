use std::fs;

use serde::{Deserialize, Serialize};

use crate::{distance::Measure, errors::PhiError};

/// Concurrency strategy for the batch runtime.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Concurrency {
    /// Single-threaded deterministic execution.
    Single,
    /// Rayon work-stealing pool with the specified number of workers.
    Rayon { workers: usize },
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::Rayon {
            workers: num_cpus::get().max(1),
        }
    }
}

/// Knobs that shape a single phi computation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputeOptions {
    #[serde(default)]
    pub measure: Measure,
    /// Evaluate candidate mechanisms and system cuts on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Reuse per-part concept lists across system bipartitions.
    #[serde(default = "default_memoize")]
    pub memoize: bool,
    /// Visit each unordered split once instead of both orderings.
    #[serde(default)]
    pub unordered_bipartitions: bool,
}

const fn default_memoize() -> bool {
    true
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            measure: Measure::default(),
            parallel: false,
            memoize: default_memoize(),
            unordered_bipartitions: false,
        }
    }
}

/// Input/output locations used by command-line callers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IoConfig {
    pub requests: Option<String>,
    pub outputs: Option<String>,
}

/// Engine configuration loaded from TOML/YAML.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub concurrency: Concurrency,
    #[serde(default)]
    pub compute: ComputeOptions,
    #[serde(default)]
    pub io: IoConfig,
}

impl EngineConfig {
    /// Load a configuration from a TOML file on disk.
    pub fn from_toml_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PhiError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, PhiError> {
        let cfg: Self = toml::from_str(raw)?;
        Ok(cfg)
    }

    /// Load a configuration from a YAML file on disk.
    pub fn from_yaml_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PhiError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&raw)?;
        Ok(cfg)
    }
}
