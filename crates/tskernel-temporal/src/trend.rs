//! Mann-Kendall trend kernel.
//!
//! The statistic is `S / (n(n-1)/2)` where `S` is the number of concordant
//! minus the number of discordant pairs over the effective sequence. Pairs are
//! counted by [`RankOrderEngine`] in `O(n log n)`; the result is identical to
//! the direct pairwise definition because `S` is an exact integer either way.

use std::time::Instant;

use async_trait::async_trait;

use crate::messages::{MannKendallInput, MannKendallOutput};
use crate::rank_order::RankOrderEngine;
use crate::types::MannKendallResult;
use tskernel_core::{
    config::KernelConfig,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    outcome::{Outcome, UndefinedReason},
    sequence::{Resolved, SequenceView},
    traits::{BatchKernel, Kernel},
};

/// Mann-Kendall trend statistic kernel.
#[derive(Debug, Clone)]
pub struct MannKendall {
    metadata: KernelMetadata,
}

impl Default for MannKendall {
    fn default() -> Self {
        Self::new()
    }
}

impl MannKendall {
    /// Stable kernel identifier.
    pub const ID: &'static str = "temporal/mann-kendall";

    /// Create a new Mann-Kendall kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: Self::kernel_metadata(),
        }
    }

    /// Registration metadata.
    pub fn kernel_metadata() -> KernelMetadata {
        KernelMetadata::scalar(Self::ID, Domain::Trend)
            .with_description("Mann-Kendall monotonic trend statistic")
            .with_throughput(200_000)
            .with_latency_us(5.0)
    }

    /// Compute the statistic for one group.
    ///
    /// Fewer than two effective values, or a missing value under the
    /// `Propagate` policy, yield the sentinel.
    pub fn compute(seq: &SequenceView<'_>, config: &KernelConfig) -> Outcome<MannKendallResult> {
        tracing::trace!(kernel = Self::ID, len = seq.len(), "computing trend statistic");

        let values = match seq.resolve(config.missing_policy) {
            Resolved::Values(values) => values,
            Resolved::Tainted => {
                return undefined(UndefinedReason::MissingValue);
            }
        };

        let n = values.len();
        if n < 2 {
            return undefined(UndefinedReason::InsufficientData {
                required: 2,
                actual: n,
            });
        }

        let counts = RankOrderEngine::count_pairs(&values);
        let pairs = 0.5 * n as f64 * (n - 1) as f64;
        Outcome::Value(MannKendallResult {
            counts,
            n,
            statistic: counts.s() as f64 / pairs,
        })
    }

    /// Reference implementation using the direct pairwise definition.
    pub fn compute_quadratic(
        seq: &SequenceView<'_>,
        config: &KernelConfig,
    ) -> Outcome<MannKendallResult> {
        let values = match seq.resolve(config.missing_policy) {
            Resolved::Values(values) => values,
            Resolved::Tainted => return Outcome::Undefined(UndefinedReason::MissingValue),
        };

        let n = values.len();
        if n < 2 {
            return Outcome::insufficient(2, n);
        }

        let counts = RankOrderEngine::count_pairs_quadratic(&values);
        let pairs = 0.5 * n as f64 * (n - 1) as f64;
        Outcome::Value(MannKendallResult {
            counts,
            n,
            statistic: counts.s() as f64 / pairs,
        })
    }
}

fn undefined<T>(reason: UndefinedReason) -> Outcome<T> {
    tracing::debug!(kernel = MannKendall::ID, %reason, "trend statistic undefined");
    Outcome::Undefined(reason)
}

/// Registry entry point.
pub fn mann_kendall(seq: &SequenceView<'_>, config: &KernelConfig) -> Result<Outcome<f64>> {
    Ok(MannKendall::compute(seq, config).map(|r| r.statistic))
}

impl Kernel for MannKendall {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<MannKendallInput, MannKendallOutput> for MannKendall {
    async fn execute(&self, input: MannKendallInput) -> Result<MannKendallOutput> {
        let start = Instant::now();
        let view = input.series.view()?;
        let result = Self::compute(&view, &input.config);
        Ok(MannKendallOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}
