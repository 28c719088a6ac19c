//! Optimizer configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fixed-point units per mg: hundredths of a mg.
pub const DEFAULT_DOSE_SCALE: u32 = 100;

/// Fixed-point units per currency unit used when comparing costs.
pub const DEFAULT_PRICE_SCALE: u32 = 10_000;

/// Largest dose-level table the optimizer will allocate.
pub const DEFAULT_MAX_DOSE_LEVELS: usize = 4_000_000;

/// Parameters of the dose-coverage search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Fixed-point units per mg for doses and strengths
    pub dose_scale: u32,
    /// Fixed-point units per currency unit for prices
    pub price_scale: u32,
    /// Upper bound on the number of dose levels searched
    pub max_dose_levels: usize,
    /// Optional wall-clock budget for one solve
    pub timeout_ms: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            dose_scale: DEFAULT_DOSE_SCALE,
            price_scale: DEFAULT_PRICE_SCALE,
            max_dose_levels: DEFAULT_MAX_DOSE_LEVELS,
            timeout_ms: None,
        }
    }
}

impl OptimizerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: OptimizerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.dose_scale == 0 {
            return Err(ConfigError::Invalid("dose_scale must be positive".into()));
        }
        if self.price_scale == 0 {
            return Err(ConfigError::Invalid("price_scale must be positive".into()));
        }
        if self.max_dose_levels == 0 {
            return Err(ConfigError::Invalid(
                "max_dose_levels must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn with_dose_scale(mut self, dose_scale: u32) -> Self {
        self.dose_scale = dose_scale;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
