//! Kaboudan predictability kernel.
//!
//! Measures how much of a forecast model's skill depends on the temporal
//! order of the data. The series is split into a fit segment and a held-out
//! tail. The model's one-step RMSE on the tail is the baseline `E0`. The fit
//! segment is then cut into contiguous blocks whose order is shuffled
//! (within-block order is kept), the model is refit, and its RMSE on the same
//! tail is recorded as `Ek`. The score is `1 - E0 / mean(Ek)`, clamped to
//! `[0, 1]`.
//!
//! Scrambling draws from a `StdRng` seeded from the configuration for every
//! call, so equal inputs and seeds give bit-identical scores regardless of
//! what other groups are evaluated concurrently.

use std::ops::Range;
use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::forecasting::ForecastModel;
use crate::messages::{KaboudanInput, KaboudanOutput};
use crate::types::KaboudanResult;
use tskernel_core::{
    config::KernelConfig,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    outcome::{Outcome, UndefinedReason},
    sequence::{Resolved, SequenceView},
    traits::{BatchKernel, Kernel},
};

/// Error ratios this close to one count as "no change".
const RATIO_TOLERANCE: f64 = 1e-12;

/// Kaboudan predictability kernel.
#[derive(Debug, Clone)]
pub struct Kaboudan {
    metadata: KernelMetadata,
}

impl Default for Kaboudan {
    fn default() -> Self {
        Self::new()
    }
}

impl Kaboudan {
    /// Stable kernel identifier.
    pub const ID: &'static str = "temporal/kaboudan";

    /// Create a new Kaboudan kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: Self::kernel_metadata(),
        }
    }

    /// Registration metadata.
    pub fn kernel_metadata() -> KernelMetadata {
        KernelMetadata::scalar(Self::ID, Domain::Predictability)
            .with_description("Kaboudan block-scrambling predictability score")
            .with_throughput(500)
            .with_latency_us(2_000.0)
    }

    /// Score one group with an explicit forecast model.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for a missing seed, zero trials or block size,
    /// or a holdout fraction outside `(0, 1)`. These are checked before the
    /// data is looked at.
    pub fn compute<M>(
        seq: &SequenceView<'_>,
        config: &KernelConfig,
        model: &M,
    ) -> Result<Outcome<KaboudanResult>>
    where
        M: ForecastModel + ?Sized,
    {
        let seed = config.validate_predictability()?;

        tracing::trace!(
            kernel = Self::ID,
            len = seq.len(),
            model = model.name(),
            trials = config.scramble_trials,
            "computing predictability"
        );

        let values = match seq.resolve(config.missing_policy) {
            Resolved::Values(values) => values,
            Resolved::Tainted => return Ok(undefined(UndefinedReason::MissingValue)),
        };

        let n = values.len();
        let tail_len = Self::tail_len(n, config.holdout_fraction);
        let fit_len = n.saturating_sub(tail_len);
        let min_fit = model.min_fit_len().max(1);
        if fit_len < min_fit {
            return Ok(undefined(UndefinedReason::InsufficientData {
                required: min_fit.saturating_add(tail_len),
                actual: n,
            }));
        }

        let (fit, tail) = values.split_at(fit_len);
        let baseline_error = model.one_step_rmse(fit, tail);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut blocks = Self::blocks(fit_len, config.scramble_block_size);
        let mut scrambled = Vec::with_capacity(fit_len);
        let mut total_error = 0.0;

        for _ in 0..config.scramble_trials {
            Self::scramble(fit, &mut blocks, &mut rng, &mut scrambled);
            total_error += model.one_step_rmse(&scrambled, tail);
        }

        let mean_scrambled_error = total_error / config.scramble_trials as f64;
        let Some(score) = Self::score(baseline_error, mean_scrambled_error) else {
            return Ok(undefined(UndefinedReason::DegenerateSeries));
        };

        Ok(Outcome::Value(KaboudanResult {
            score,
            baseline_error,
            mean_scrambled_error,
            trials: config.scramble_trials,
        }))
    }

    /// Length of the held-out tail: `max(1, round(n * fraction))`.
    pub fn tail_len(n: usize, holdout_fraction: f64) -> usize {
        ((n as f64 * holdout_fraction).round() as usize).max(1)
    }

    /// Contiguous blocks covering `0..len`; the last may be shorter.
    fn blocks(len: usize, block_size: usize) -> Vec<Range<usize>> {
        (0..len)
            .step_by(block_size.max(1))
            .map(|start| start..(start + block_size).min(len))
            .collect()
    }

    /// Write one scrambled replica of `fit` into `out`. Block order is
    /// reshuffled on every call; values inside a block keep their order.
    fn scramble(fit: &[f64], blocks: &mut [Range<usize>], rng: &mut StdRng, out: &mut Vec<f64>) {
        blocks.shuffle(rng);
        out.clear();
        for block in blocks.iter() {
            out.extend_from_slice(&fit[block.clone()]);
        }
    }

    /// Clamped score, or `None` if either error is not finite.
    pub fn score(baseline_error: f64, mean_scrambled_error: f64) -> Option<f64> {
        if !baseline_error.is_finite() || !mean_scrambled_error.is_finite() {
            return None;
        }
        if mean_scrambled_error <= 0.0 {
            return Some(0.0);
        }
        let ratio = baseline_error / mean_scrambled_error;
        if (ratio - 1.0).abs() <= RATIO_TOLERANCE {
            return Some(0.0);
        }
        Some((1.0 - ratio).clamp(0.0, 1.0))
    }
}

fn undefined<T>(reason: UndefinedReason) -> Outcome<T> {
    tracing::debug!(kernel = Kaboudan::ID, %reason, "predictability undefined");
    Outcome::Undefined(reason)
}

/// Registry entry point, using the configured forecast model.
pub fn kaboudan(seq: &SequenceView<'_>, config: &KernelConfig) -> Result<Outcome<f64>> {
    Ok(Kaboudan::compute(seq, config, &config.forecast_model)?.map(|r| r.score))
}

impl Kernel for Kaboudan {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<KaboudanInput, KaboudanOutput> for Kaboudan {
    async fn execute(&self, input: KaboudanInput) -> Result<KaboudanOutput> {
        let start = Instant::now();
        let view = input.series.view()?;
        let result = Self::compute(&view, &input.config, &input.config.forecast_model)?;
        Ok(KaboudanOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &KaboudanInput) -> Result<()> {
        input.config.validate_predictability().map(|_| ())
    }
}
