//! Message types for temporal kernels.
//!
//! Input/output message types for the `BatchKernel` trait implementations.
//! Every input carries one group's series and the shared kernel
//! configuration; every output carries the kernel's outcome and the
//! computation time.

use serde::{Deserialize, Serialize};
use tskernel_core::config::{DecompositionMode, KernelConfig};
use tskernel_core::outcome::Outcome;
use tskernel_core::sequence::OwnedSequence;

use crate::types::{DecompositionFeatures, DecompositionResult, KaboudanResult, MannKendallResult};

// ============================================================================
// Mann-Kendall Messages
// ============================================================================

/// Input for the Mann-Kendall trend statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MannKendallInput {
    /// Input series.
    pub series: OwnedSequence,
    /// Kernel configuration (only the missing-value policy is read).
    #[serde(default)]
    pub config: KernelConfig,
}

impl MannKendallInput {
    /// Create a new Mann-Kendall input.
    pub fn new(series: OwnedSequence, config: KernelConfig) -> Self {
        Self { series, config }
    }
}

/// Output from the Mann-Kendall trend statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MannKendallOutput {
    /// Pair counts and statistic, or the sentinel.
    pub result: Outcome<MannKendallResult>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Seasonal Decomposition Messages
// ============================================================================

/// Input for seasonal decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalDecompositionInput {
    /// Input series.
    pub series: OwnedSequence,
    /// Kernel configuration (period, mode and missing-value policy).
    #[serde(default)]
    pub config: KernelConfig,
}

impl SeasonalDecompositionInput {
    /// Create a new seasonal decomposition input.
    pub fn new(series: OwnedSequence, config: KernelConfig) -> Self {
        Self { series, config }
    }

    /// Create with additive decomposition.
    pub fn additive(series: OwnedSequence, period: usize) -> Self {
        Self::new(series, KernelConfig::new().with_period(period))
    }

    /// Create with multiplicative decomposition.
    pub fn multiplicative(series: OwnedSequence, period: usize) -> Self {
        Self::new(
            series,
            KernelConfig::new()
                .with_period(period)
                .with_mode(DecompositionMode::Multiplicative),
        )
    }
}

/// Output from seasonal decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalDecompositionOutput {
    /// Decomposition result with trend, seasonal, and residual.
    pub result: Outcome<DecompositionResult>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Decomposition Feature Messages
// ============================================================================

/// Input for decomposition strength features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionFeaturesInput {
    /// Input series.
    pub series: OwnedSequence,
    /// Kernel configuration, as for decomposition.
    #[serde(default)]
    pub config: KernelConfig,
}

impl DecompositionFeaturesInput {
    /// Create a new feature input.
    pub fn new(series: OwnedSequence, config: KernelConfig) -> Self {
        Self { series, config }
    }
}

/// Output from decomposition strength features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionFeaturesOutput {
    /// Features, or the decomposition sentinel.
    pub result: Outcome<DecompositionFeatures>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Kaboudan Messages
// ============================================================================

/// Input for the Kaboudan predictability score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaboudanInput {
    /// Input series.
    pub series: OwnedSequence,
    /// Kernel configuration (seed, trials, block size, holdout, model).
    #[serde(default)]
    pub config: KernelConfig,
}

impl KaboudanInput {
    /// Create a new Kaboudan input.
    pub fn new(series: OwnedSequence, config: KernelConfig) -> Self {
        Self { series, config }
    }
}

/// Output from the Kaboudan predictability score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaboudanOutput {
    /// Score and error breakdown, or the sentinel.
    pub result: Outcome<KaboudanResult>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_from_json() {
        let input: KaboudanInput = serde_json::from_str(
            r#"{"series":{"values":[1.0,2.0,3.0]},"config":{"seed":9,"forecast_model":{"kind":"auto_regressive","order":2}}}"#,
        )
        .unwrap();
        assert_eq!(input.config.seed, Some(9));
        assert_eq!(input.series.values.len(), 3);
        assert_eq!(input.config.scramble_trials, 100);
    }

    #[test]
    fn test_config_defaults_when_absent() {
        let input: MannKendallInput =
            serde_json::from_str(r#"{"series":{"values":[1.0,0.0],"validity":[true,false]}}"#)
                .unwrap();
        assert_eq!(input.config, KernelConfig::default());
        assert_eq!(input.series.view().unwrap().missing_count(), 1);
    }

    #[test]
    fn test_sentinel_output_json() {
        let output = MannKendallOutput {
            result: Outcome::insufficient(2, 1),
            compute_time_us: 0,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["result"]["undefined"]["reason"], "insufficient_data");
        assert_eq!(json["result"]["undefined"]["required"], 2);
    }

    #[test]
    fn test_decomposition_constructors() {
        let input = SeasonalDecompositionInput::multiplicative(OwnedSequence::default(), 12);
        assert_eq!(input.config.period, Some(12));
        assert_eq!(input.config.mode, DecompositionMode::Multiplicative);
    }
}
