//! Pairwise rank-order counting.
//!
//! Classifies every index pair `i < j` of a sequence as concordant
//! (`y[i] < y[j]`), discordant (`y[i] > y[j]`) or tied, in `O(n log n)` time by
//! counting strict inversions during a merge sort. Ties never count as
//! inversions; they are counted from the runs of equal values in the sorted
//! output, and the concordant count follows from the pair total.

use crate::types::PairCounts;
use tskernel_core::{
    config::MissingPolicy,
    outcome::{Outcome, UndefinedReason},
    sequence::{Resolved, SequenceView},
};

/// Below this length a subproblem is sorted by insertion.
const INSERTION_THRESHOLD: usize = 16;

/// Rank-order pair counting engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankOrderEngine;

impl RankOrderEngine {
    /// Count concordant, discordant and tied pairs.
    ///
    /// The input must not contain `NaN`; resolve missing values first.
    pub fn count_pairs(values: &[f64]) -> PairCounts {
        let n = values.len();
        if n < 2 {
            return PairCounts::default();
        }

        let mut data = values.to_vec();
        let mut scratch = vec![0.0; n];
        let discordant = Self::sort_and_count(&mut data, &mut scratch);
        let tied = Self::tied_pairs(&data);
        let total = pair_total(n);

        PairCounts {
            concordant: total - discordant - tied,
            discordant,
            tied,
        }
    }

    /// Count pairs of a view after applying a missing-value policy.
    ///
    /// Under `Skip` the missing positions are removed first; under
    /// `Propagate` any missing position yields the sentinel.
    pub fn count_pairs_view(seq: &SequenceView<'_>, policy: MissingPolicy) -> Outcome<PairCounts> {
        match seq.resolve(policy) {
            Resolved::Values(values) => Outcome::Value(Self::count_pairs(&values)),
            Resolved::Tainted => Outcome::Undefined(UndefinedReason::MissingValue),
        }
    }

    /// Direct `O(n^2)` classification of every pair.
    pub fn count_pairs_quadratic(values: &[f64]) -> PairCounts {
        let mut counts = PairCounts::default();
        for (i, &a) in values.iter().enumerate() {
            for &b in &values[i + 1..] {
                if b > a {
                    counts.concordant += 1;
                } else if b < a {
                    counts.discordant += 1;
                } else {
                    counts.tied += 1;
                }
            }
        }
        counts
    }

    /// Sort `data` ascending, returning the number of strict inversions.
    /// `scratch` must have the same length as `data`.
    fn sort_and_count(data: &mut [f64], scratch: &mut [f64]) -> u64 {
        let n = data.len();
        if n <= INSERTION_THRESHOLD {
            return Self::insertion_sort_and_count(data);
        }

        let mid = n / 2;
        let mut inversions = {
            let (left, right) = data.split_at_mut(mid);
            let (scratch_left, scratch_right) = scratch.split_at_mut(mid);
            Self::sort_and_count(left, scratch_left) + Self::sort_and_count(right, scratch_right)
        };

        let (mut i, mut j, mut k) = (0, mid, 0);
        while i < mid && j < n {
            // Equal values take the left element first, so they never invert.
            if data[i] <= data[j] {
                scratch[k] = data[i];
                i += 1;
            } else {
                scratch[k] = data[j];
                j += 1;
                inversions += (mid - i) as u64;
            }
            k += 1;
        }
        let rest = mid - i;
        scratch[k..k + rest].copy_from_slice(&data[i..mid]);
        k += rest;
        scratch[k..n].copy_from_slice(&data[j..n]);
        data.copy_from_slice(&scratch[..n]);

        inversions
    }

    fn insertion_sort_and_count(data: &mut [f64]) -> u64 {
        let mut inversions = 0u64;
        for i in 1..data.len() {
            let key = data[i];
            let mut j = i;
            while j > 0 && data[j - 1] > key {
                data[j] = data[j - 1];
                j -= 1;
                inversions += 1;
            }
            data[j] = key;
        }
        inversions
    }

    /// Sum of `t(t-1)/2` over runs of equal values in sorted data.
    fn tied_pairs(sorted: &[f64]) -> u64 {
        let mut tied = 0u64;
        let mut run = 1u64;
        for w in sorted.windows(2) {
            if w[0] == w[1] {
                run += 1;
            } else {
                tied += run * (run - 1) / 2;
                run = 1;
            }
        }
        tied + run * (run - 1) / 2
    }
}

/// Number of unordered pairs among `n` items.
pub(crate) fn pair_total(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}
