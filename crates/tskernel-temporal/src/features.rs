//! Decomposition strength features.
//!
//! Summaries of a classical decomposition, computed over the positions where
//! the residual is defined:
//!
//! - trend strength: `max(0, 1 - Var(R) / Var(T + R))`
//! - seasonal strength: `max(0, 1 - Var(R) / Var(S + R))`
//! - residual variance: `Std(R) / Mean(y)`, with the mean over all present
//!   input values
//!
//! Variances are sample variances. A feature whose denominator is zero, or
//! which has fewer than two residuals to work with, is undefined.
//!
//! A multiplicative decomposition `y = T * S * R` is measured on the log
//! scale, where it is additive: the strengths use `ln T`, `ln S` and `ln R`,
//! and the residual variance is `Std(R)`, since `R` is already relative to
//! the level of the series.

use std::time::Instant;

use async_trait::async_trait;

use crate::decomposition::SeasonalDecomposition;
use crate::messages::{DecompositionFeaturesInput, DecompositionFeaturesOutput};
use crate::types::{DecompositionFeatures, DecompositionResult};
use tskernel_core::{
    config::{DecompositionMode, KernelConfig},
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    outcome::{Outcome, UndefinedReason},
    sequence::SequenceView,
    traits::{BatchKernel, Kernel},
};

/// Decomposition feature kernel.
#[derive(Debug, Clone)]
pub struct DecompositionFeaturesKernel {
    metadata: KernelMetadata,
}

impl Default for DecompositionFeaturesKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl DecompositionFeaturesKernel {
    /// Identifier of the combined feature kernel.
    pub const ID: &'static str = "temporal/decomposition-features";
    /// Identifier of the trend strength kernel.
    pub const TREND_STRENGTH_ID: &'static str = "temporal/trend-strength";
    /// Identifier of the seasonal strength kernel.
    pub const SEASONAL_STRENGTH_ID: &'static str = "temporal/seasonal-strength";
    /// Identifier of the residual variance kernel.
    pub const RESIDUAL_VARIANCE_ID: &'static str = "temporal/residual-variance";

    /// Create a new feature kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::scalar(Self::ID, Domain::Seasonality)
                .with_description("Trend/seasonal strength and residual variance")
                .with_throughput(40_000)
                .with_latency_us(25.0),
        }
    }

    /// Registration metadata for the three scalar feature kernels.
    pub fn scalar_metadata() -> [KernelMetadata; 3] {
        [
            KernelMetadata::scalar(Self::TREND_STRENGTH_ID, Domain::Seasonality)
                .with_description("Strength of the trend component"),
            KernelMetadata::scalar(Self::SEASONAL_STRENGTH_ID, Domain::Seasonality)
                .with_description("Strength of the seasonal component"),
            KernelMetadata::scalar(Self::RESIDUAL_VARIANCE_ID, Domain::Seasonality)
                .with_description("Residual standard deviation relative to the series mean"),
        ]
        .map(|m| m.with_throughput(40_000).with_latency_us(25.0))
    }

    /// Decompose one group and summarize it.
    ///
    /// Configuration errors and sentinels are those of
    /// [`SeasonalDecomposition::compute`].
    pub fn compute(
        seq: &SequenceView<'_>,
        config: &KernelConfig,
    ) -> Result<Outcome<DecompositionFeatures>> {
        Ok(SeasonalDecomposition::compute(seq, config)?
            .map(|result| Self::from_decomposition(seq, &result)))
    }

    /// Summarize an existing decomposition of `seq`.
    pub fn from_decomposition(
        seq: &SequenceView<'_>,
        result: &DecompositionResult,
    ) -> DecompositionFeatures {
        let rows: Vec<(f64, f64, f64)> = result
            .trend
            .iter()
            .zip(&result.seasonal)
            .zip(&result.residual)
            .filter_map(|((t, s), r)| match (t, r) {
                (Some(t), Some(r)) => Some((*t, *s, *r)),
                _ => None,
            })
            .collect();

        let (trend_strength, seasonal_strength, residual_variance) = match result.mode {
            DecompositionMode::Additive => {
                let var_r = sample_variance(rows.iter().map(|&(_, _, r)| r));
                let (trend, seasonal) = strengths(&rows, var_r);
                (trend, seasonal, residual_variance(var_r, seq))
            }
            DecompositionMode::Multiplicative => {
                let logs: Vec<(f64, f64, f64)> = rows
                    .iter()
                    .map(|&(t, s, r)| (t.ln(), s.ln(), r.ln()))
                    .collect();
                let var_log_r = sample_variance(logs.iter().map(|&(_, _, r)| r));
                let (trend, seasonal) = strengths(&logs, var_log_r);
                let spread = sample_variance(rows.iter().map(|&(_, _, r)| r))
                    .map_or(Outcome::Undefined(UndefinedReason::DegenerateSeries), |v| {
                        Outcome::Value(v.sqrt())
                    });
                (trend, seasonal, spread)
            }
        };

        let features = DecompositionFeatures {
            trend_strength,
            seasonal_strength,
            residual_variance,
        };

        tracing::trace!(
            kernel = Self::ID,
            rows = rows.len(),
            trend_strength = features.trend_strength.to_f64(),
            seasonal_strength = features.seasonal_strength.to_f64(),
            "computed decomposition features"
        );

        features
    }
}

/// Trend and seasonal strength of additive `(t, s, r)` rows.
fn strengths(rows: &[(f64, f64, f64)], var_r: Option<f64>) -> (Outcome<f64>, Outcome<f64>) {
    let var_tr = sample_variance(rows.iter().map(|&(t, _, r)| t + r));
    let var_sr = sample_variance(rows.iter().map(|&(_, s, r)| s + r));
    (strength(var_r, var_tr), strength(var_r, var_sr))
}

fn strength(var_r: Option<f64>, var_total: Option<f64>) -> Outcome<f64> {
    match (var_r, var_total) {
        (Some(var_r), Some(var_total)) if var_total > 0.0 => {
            Outcome::Value((1.0 - var_r / var_total).max(0.0))
        }
        _ => Outcome::Undefined(UndefinedReason::DegenerateSeries),
    }
}

fn residual_variance(var_r: Option<f64>, seq: &SequenceView<'_>) -> Outcome<f64> {
    let (sum, count) = seq
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    match var_r {
        Some(var_r) if count > 0 && sum != 0.0 => {
            Outcome::Value(var_r.sqrt() / (sum / count as f64))
        }
        _ => Outcome::Undefined(UndefinedReason::DegenerateSeries),
    }
}

/// Sample variance, or `None` for fewer than two values.
fn sample_variance(values: impl Iterator<Item = f64> + Clone) -> Option<f64> {
    let (sum, count) = values
        .clone()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count < 2 {
        return None;
    }
    let mean = sum / count as f64;
    let ss: f64 = values.map(|v| (v - mean).powi(2)).sum();
    Some(ss / (count - 1) as f64)
}

/// Registry entry point for trend strength.
pub fn trend_strength(seq: &SequenceView<'_>, config: &KernelConfig) -> Result<Outcome<f64>> {
    Ok(DecompositionFeaturesKernel::compute(seq, config)?.and_then(|f| f.trend_strength))
}

/// Registry entry point for seasonal strength.
pub fn seasonal_strength(seq: &SequenceView<'_>, config: &KernelConfig) -> Result<Outcome<f64>> {
    Ok(DecompositionFeaturesKernel::compute(seq, config)?.and_then(|f| f.seasonal_strength))
}

/// Registry entry point for residual variance.
pub fn residual_variance_kernel(
    seq: &SequenceView<'_>,
    config: &KernelConfig,
) -> Result<Outcome<f64>> {
    Ok(DecompositionFeaturesKernel::compute(seq, config)?.and_then(|f| f.residual_variance))
}

impl Kernel for DecompositionFeaturesKernel {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<DecompositionFeaturesInput, DecompositionFeaturesOutput>
    for DecompositionFeaturesKernel
{
    async fn execute(
        &self,
        input: DecompositionFeaturesInput,
    ) -> Result<DecompositionFeaturesOutput> {
        let start = Instant::now();
        let view = input.series.view()?;
        let result = Self::compute(&view, &input.config)?;
        Ok(DecompositionFeaturesOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &DecompositionFeaturesInput) -> Result<()> {
        input.config.validate_decomposition().map(|_| ())
    }
}
