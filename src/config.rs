// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (WALLCHEB_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::simulator;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Backend selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,

    /// Projection run settings
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["config.yaml", "config.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("WALLCHEB_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("WALLCHEB_BACKEND") {
            self.backend.name = val;
        }
        if let Ok(val) = env::var("WALLCHEB_SEED") {
            if let Ok(seed) = val.parse() {
                self.backend.seed = seed;
            }
        }
        if let Ok(val) = env::var("WALLCHEB_SHOTS") {
            if let Ok(shots) = val.parse() {
                self.run.shots = shots;
            }
        }
        if let Ok(val) = env::var("WALLCHEB_EXACT") {
            self.run.exact = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = env::var("WALLCHEB_OUTPUT") {
            self.run.output = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.run.order_min == 0 {
            return Err(Error::Config("filter order must be at least 1".into()));
        }
        if self.run.order_min > self.run.order_max {
            return Err(Error::Config(format!(
                "order range is empty: {} > {}",
                self.run.order_min, self.run.order_max
            )));
        }
        if self.run.order_max > self.limits.max_filter_order {
            return Err(Error::Config(format!(
                "filter order {} exceeds limit {}",
                self.run.order_max, self.limits.max_filter_order
            )));
        }
        if self.run.alpha <= 0.0 {
            return Err(Error::Config("alpha must be positive".into()));
        }
        if !self.run.exact && self.run.shots == 0 {
            return Err(Error::Config(
                "sampled runs need a nonzero shot count".into(),
            ));
        }
        if self.run.shots > self.limits.max_shots {
            return Err(Error::Config(format!(
                "shots {} exceed limit {}",
                self.run.shots, self.limits.max_shots
            )));
        }
        if self.limits.max_qubits as usize > simulator::MAX_QUBITS {
            return Err(Error::Config(format!(
                "max_qubits {} exceeds the engine limit {}",
                self.limits.max_qubits,
                simulator::MAX_QUBITS
            )));
        }
        match &self.run.model {
            ModelConfig::Ising { n_qubits, .. } => {
                if *n_qubits == 0 {
                    return Err(Error::Config("ising model needs at least one qubit".into()));
                }
                if *n_qubits > self.limits.max_qubits {
                    return Err(Error::Config(format!(
                        "ising model width {} exceeds max_qubits {}",
                        n_qubits, self.limits.max_qubits
                    )));
                }
            }
            ModelConfig::Hubbard { n_sites, .. } => {
                if *n_sites == 0 {
                    return Err(Error::Config("hubbard model needs at least one site".into()));
                }
                if 2 * n_sites > self.limits.max_qubits {
                    return Err(Error::Config(format!(
                        "hubbard model width {} exceeds max_qubits {}",
                        2 * n_sites,
                        self.limits.max_qubits
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend to run projections on
    #[serde(default = "default_backend_name")]
    pub name: String,

    /// Shot-sampling seed
    #[serde(default)]
    pub seed: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            seed: 0,
        }
    }
}

fn default_backend_name() -> String {
    "statevector".into()
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum state-register qubits
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,

    /// Maximum shots per run
    #[serde(default = "default_max_shots")]
    pub max_shots: u32,

    /// Maximum operator terms
    #[serde(default = "default_max_terms")]
    pub max_terms: u32,

    /// Maximum wall filter order
    #[serde(default = "default_max_filter_order")]
    pub max_filter_order: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            max_shots: default_max_shots(),
            max_terms: default_max_terms(),
            max_filter_order: default_max_filter_order(),
        }
    }
}

fn default_max_qubits() -> u32 {
    16
}

fn default_max_shots() -> u32 {
    1_000_000
}

fn default_max_terms() -> u32 {
    4096
}

fn default_max_filter_order() -> u32 {
    64
}

/// Model selection for the projection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum ModelConfig {
    /// Transverse-field Ising chain
    Ising { n_qubits: u32, h: f64, j: f64 },
    /// Fermi-Hubbard chain at half filling
    Hubbard {
        u: f64,
        n_sites: u32,
        /// Reference determinant bitmask; defaults to the half-filling
        /// two-site choice when absent
        #[serde(default)]
        reference: Option<u64>,
    },
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::Hubbard {
            u: 1.0,
            n_sites: 2,
            reference: None,
        }
    }
}

/// Projection run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Model Hamiltonian
    #[serde(default)]
    pub model: ModelConfig,

    /// Smallest wall filter order
    #[serde(default = "default_order_min")]
    pub order_min: u32,

    /// Largest wall filter order
    #[serde(default = "default_order_max")]
    pub order_max: u32,

    /// Spectral window scale for the shift values
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Shots per order for sampled runs
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Use exact state-vector projection instead of shot sampling
    #[serde(default = "default_true")]
    pub exact: bool,

    /// Results output path (.json or .csv)
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            order_min: default_order_min(),
            order_max: default_order_max(),
            alpha: default_alpha(),
            shots: default_shots(),
            exact: true,
            output: default_output(),
        }
    }
}

fn default_order_min() -> u32 {
    1
}

fn default_order_max() -> u32 {
    8
}

fn default_alpha() -> f64 {
    1.0
}

fn default_shots() -> u32 {
    25_000
}

fn default_true() -> bool {
    true
}

fn default_output() -> String {
    "wallcheb_results.csv".into()
}
