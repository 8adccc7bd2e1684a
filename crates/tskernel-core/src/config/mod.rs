//! Kernel configuration.
//!
//! One [`KernelConfig`] is shared by every kernel; each kernel reads the
//! fields it needs and validates them eagerly, before touching the data.
//!
//! # Example
//!
//! ```rust,ignore
//! use tskernel_core::config::KernelConfig;
//!
//! // Load from environment
//! let config = KernelConfig::from_env()?;
//!
//! // Or load from file
//! let config = KernelConfig::from_file("config/kernels.toml")?;
//! ```

use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What to do with missing positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Any missing value makes the whole group's result undefined.
    #[default]
    Propagate,
    /// Missing values are dropped (or, for decomposition, left as gaps).
    Skip,
}

impl FromStr for MissingPolicy {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "skip" => Ok(Self::Skip),
            _ => Err(KernelError::invalid_config(format!(
                "Invalid missing policy '{}'. Expected 'propagate' or 'skip'.",
                s
            ))),
        }
    }
}

/// Decomposition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionMode {
    /// `y = trend + seasonal + residual`
    #[default]
    Additive,
    /// `y = trend * seasonal * residual`
    Multiplicative,
}

impl DecompositionMode {
    /// Mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Multiplicative => "multiplicative",
        }
    }
}

impl fmt::Display for DecompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DecompositionMode {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "additive" => Ok(Self::Additive),
            "multiplicative" => Ok(Self::Multiplicative),
            _ => Err(KernelError::invalid_config(format!(
                "Invalid method '{}'. Expected 'additive' or 'multiplicative'.",
                s
            ))),
        }
    }
}

/// Built-in forecast model used by the predictability kernel when it is
/// invoked through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastModelKind {
    /// Constant forecast at the fit-segment mean.
    #[default]
    Mean,
    /// Last observed value.
    Naive,
    /// Autoregressive model of the given order.
    AutoRegressive {
        /// Number of lags.
        order: usize,
    },
}

/// Configuration shared by all kernels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Missing-value policy.
    pub missing_policy: MissingPolicy,
    /// Seasonal period (decomposition only).
    pub period: Option<usize>,
    /// Decomposition model (decomposition only).
    pub mode: DecompositionMode,
    /// Number of scrambled replicas (predictability only).
    pub scramble_trials: usize,
    /// Length of the contiguous blocks that are permuted (predictability only).
    pub scramble_block_size: usize,
    /// Seed for block scrambling (predictability only, required).
    pub seed: Option<u64>,
    /// Share of the series held out as the evaluation tail.
    pub holdout_fraction: f64,
    /// Forecast model for registry invocations of the predictability kernel.
    pub forecast_model: ForecastModelKind,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            missing_policy: MissingPolicy::Propagate,
            period: None,
            mode: DecompositionMode::Additive,
            scramble_trials: 100,
            scramble_block_size: 5,
            seed: None,
            holdout_fraction: 0.2,
            forecast_model: ForecastModelKind::Mean,
        }
    }
}

impl KernelConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; malformed ones are rejected.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TSKERNEL_MISSING_POLICY") {
            config.missing_policy = val.parse()?;
        }

        if let Ok(val) = std::env::var("TSKERNEL_PERIOD") {
            config.period = Some(parse_env("TSKERNEL_PERIOD", &val)?);
        }

        if let Ok(val) = std::env::var("TSKERNEL_MODE") {
            config.mode = val.parse()?;
        }

        if let Ok(val) = std::env::var("TSKERNEL_SCRAMBLE_TRIALS") {
            config.scramble_trials = parse_env("TSKERNEL_SCRAMBLE_TRIALS", &val)?;
        }

        if let Ok(val) = std::env::var("TSKERNEL_SCRAMBLE_BLOCK_SIZE") {
            config.scramble_block_size = parse_env("TSKERNEL_SCRAMBLE_BLOCK_SIZE", &val)?;
        }

        if let Ok(val) = std::env::var("TSKERNEL_SEED") {
            config.seed = Some(parse_env("TSKERNEL_SEED", &val)?);
        }

        if let Ok(val) = std::env::var("TSKERNEL_HOLDOUT_FRACTION") {
            config.holdout_fraction = parse_env("TSKERNEL_HOLDOUT_FRACTION", &val)?;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KernelError::ConfigError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a TOML file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KernelError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate the fields used by seasonal decomposition.
    ///
    /// Returns the period on success.
    pub fn validate_decomposition(&self) -> Result<usize> {
        match self.period {
            None => Err(KernelError::invalid_config(
                "decomposition requires a period",
            )),
            Some(p) if p < 2 => Err(KernelError::invalid_config(format!(
                "Invalid frequency '{}'. Frequency must be greater than 1.",
                p
            ))),
            Some(p) if p.checked_mul(2).is_none() => Err(KernelError::invalid_config(format!(
                "Invalid frequency '{}'. Frequency is too large.",
                p
            ))),
            Some(p) => Ok(p),
        }
    }

    /// Validate the fields used by the predictability kernel.
    ///
    /// Returns the seed on success.
    pub fn validate_predictability(&self) -> Result<u64> {
        if self.scramble_trials == 0 {
            return Err(KernelError::invalid_config(
                "scramble_trials must be at least 1",
            ));
        }
        if self.scramble_block_size == 0 {
            return Err(KernelError::invalid_config(
                "scramble_block_size must be at least 1",
            ));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(KernelError::invalid_config(format!(
                "holdout_fraction must lie in (0, 1), got {}",
                self.holdout_fraction
            )));
        }
        if let ForecastModelKind::AutoRegressive { order: 0 } = self.forecast_model {
            return Err(KernelError::invalid_config(
                "autoregressive order must be at least 1",
            ));
        }
        self.seed.ok_or_else(|| {
            KernelError::invalid_config("a scrambling seed is required for reproducible scores")
        })
    }

    /// Set the missing-value policy.
    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    /// Set the seasonal period.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    /// Set the decomposition mode.
    pub fn with_mode(mut self, mode: DecompositionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of scrambled trials.
    pub fn with_scramble_trials(mut self, trials: usize) -> Self {
        self.scramble_trials = trials;
        self
    }

    /// Set the scrambling block size.
    pub fn with_scramble_block_size(mut self, block_size: usize) -> Self {
        self.scramble_block_size = block_size;
        self
    }

    /// Set the scrambling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the holdout fraction.
    pub fn with_holdout_fraction(mut self, fraction: f64) -> Self {
        self.holdout_fraction = fraction;
        self
    }

    /// Set the forecast model.
    pub fn with_forecast_model(mut self, model: ForecastModelKind) -> Self {
        self.forecast_model = model;
        self
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| KernelError::ConfigError(format!("Invalid value for {}: '{}'", name, value)))
}
