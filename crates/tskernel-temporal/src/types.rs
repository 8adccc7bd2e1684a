//! Temporal analysis types and data structures.

use serde::{Deserialize, Serialize};
use tskernel_core::config::DecompositionMode;
use tskernel_core::outcome::{ComponentColumns, Outcome};

// ============================================================================
// Rank-Order Types
// ============================================================================

/// Classification of all unordered index pairs `i < j`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCounts {
    /// Pairs with `y[i] < y[j]`.
    pub concordant: u64,
    /// Pairs with `y[i] > y[j]`.
    pub discordant: u64,
    /// Pairs with `y[i] == y[j]`.
    pub tied: u64,
}

impl PairCounts {
    /// Total number of pairs, `n(n-1)/2`.
    pub fn total(&self) -> u64 {
        self.concordant + self.discordant + self.tied
    }

    /// Mann-Kendall S: concordant minus discordant.
    pub fn s(&self) -> i64 {
        self.concordant as i64 - self.discordant as i64
    }

    /// S normalized by the number of pairs, or `None` without pairs.
    pub fn tau(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            None
        } else {
            Some(self.s() as f64 / total as f64)
        }
    }
}

/// Mann-Kendall trend result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannKendallResult {
    /// Pair classification.
    pub counts: PairCounts,
    /// Effective length after missing-value handling.
    pub n: usize,
    /// `S / (n(n-1)/2)`, in `[-1, 1]`.
    pub statistic: f64,
}

// ============================================================================
// Decomposition Types
// ============================================================================

/// Classical seasonal decomposition result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Trend component (`None` at the edges and around missing positions).
    pub trend: Vec<Option<f64>>,
    /// Seasonal component, the per-phase indices tiled to the input length.
    pub seasonal: Vec<f64>,
    /// Residual component (`None` wherever trend or input is undefined).
    pub residual: Vec<Option<f64>>,
    /// Normalized per-phase seasonal indices.
    pub seasonal_indices: Vec<f64>,
    /// Seasonal period used.
    pub period: usize,
    /// Decomposition model.
    pub mode: DecompositionMode,
}

impl DecompositionResult {
    /// Original series length.
    pub fn len(&self) -> usize {
        self.seasonal.len()
    }

    /// Check if the decomposition is empty.
    pub fn is_empty(&self) -> bool {
        self.seasonal.is_empty()
    }

    /// Convert into host-facing columns.
    pub fn into_columns(self) -> ComponentColumns {
        ComponentColumns {
            trend: self.trend,
            seasonal: self.seasonal.into_iter().map(Some).collect(),
            residual: self.residual,
        }
    }
}

/// Strength features derived from a decomposition.
///
/// Each feature is undefined on its own when its denominator vanishes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionFeatures {
    /// `max(0, 1 - Var(R) / Var(T + R))`
    pub trend_strength: Outcome<f64>,
    /// `max(0, 1 - Var(R) / Var(S + R))`
    pub seasonal_strength: Outcome<f64>,
    /// `Std(R) / Mean(y)`
    pub residual_variance: Outcome<f64>,
}

// ============================================================================
// Predictability Types
// ============================================================================

/// Kaboudan predictability result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KaboudanResult {
    /// Score in `[0, 1]`.
    pub score: f64,
    /// One-step RMSE of the model fit on the unscrambled segment.
    pub baseline_error: f64,
    /// Mean one-step RMSE over the scrambled trials.
    pub mean_scrambled_error: f64,
    /// Number of scrambled trials.
    pub trials: usize,
}
