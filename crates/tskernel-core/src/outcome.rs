//! Kernel outcomes and sentinel values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a kernel produced no value for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UndefinedReason {
    /// The effective sequence is shorter than the kernel requires.
    InsufficientData {
        /// Minimum effective length.
        required: usize,
        /// Effective length after missing-value handling.
        actual: usize,
    },
    /// A missing value was found under the `Propagate` policy.
    MissingValue,
    /// Multiplicative decomposition met a zero or negative value.
    NonPositiveData,
    /// The statistic has a zero denominator for this input.
    DegenerateSeries,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { required, actual } => {
                write!(f, "insufficient data ({} < {})", actual, required)
            }
            Self::MissingValue => write!(f, "missing value"),
            Self::NonPositiveData => write!(f, "non-positive data"),
            Self::DegenerateSeries => write!(f, "degenerate series"),
        }
    }
}

/// Result of one kernel invocation over one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The statistic is defined.
    Value(T),
    /// The sentinel: no value for this group.
    Undefined(UndefinedReason),
}

impl<T> Outcome<T> {
    /// Shorthand for an insufficient-data sentinel.
    #[must_use]
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Outcome::Undefined(UndefinedReason::InsufficientData { required, actual })
    }

    /// Returns the value, if defined.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Undefined(_) => None,
        }
    }

    /// Borrow the value, if defined.
    #[must_use]
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Undefined(_) => None,
        }
    }

    /// Returns true for the sentinel.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Outcome::Undefined(_))
    }

    /// The sentinel reason, if undefined.
    #[must_use]
    pub fn reason(&self) -> Option<UndefinedReason> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Undefined(reason) => Some(*reason),
        }
    }

    /// Map a defined value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Value(v) => Outcome::Value(f(v)),
            Outcome::Undefined(reason) => Outcome::Undefined(reason),
        }
    }

    /// Chain a computation that may itself be undefined.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Value(v) => f(v),
            Outcome::Undefined(reason) => Outcome::Undefined(reason),
        }
    }
}

impl Outcome<f64> {
    /// Column representation: the sentinel becomes `NaN`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Outcome::Value(v) => *v,
            Outcome::Undefined(_) => f64::NAN,
        }
    }
}

/// Host-facing form of a decomposition: three aligned columns, one row per
/// input position. `None` marks positions without an estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentColumns {
    /// Trend column.
    pub trend: Vec<Option<f64>>,
    /// Seasonal column.
    pub seasonal: Vec<Option<f64>>,
    /// Residual column.
    pub residual: Vec<Option<f64>>,
}

impl ComponentColumns {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trend.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trend.is_empty()
    }

    /// Iterate rows as `(trend, seasonal, residual)`.
    pub fn rows(&self) -> impl Iterator<Item = (Option<f64>, Option<f64>, Option<f64>)> + '_ {
        self.trend
            .iter()
            .zip(&self.seasonal)
            .zip(&self.residual)
            .map(|((t, s), r)| (*t, *s, *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        let outcome = Outcome::Value(0.5);
        assert!(!outcome.is_undefined());
        assert_eq!(outcome.to_f64(), 0.5);
        assert_eq!(outcome.reason(), None);
        assert_eq!(outcome.value(), Some(0.5));
    }

    #[test]
    fn test_sentinel_is_nan_not_zero() {
        let outcome: Outcome<f64> = Outcome::insufficient(2, 1);
        assert!(outcome.is_undefined());
        assert!(outcome.to_f64().is_nan());
        assert_eq!(
            outcome.reason(),
            Some(UndefinedReason::InsufficientData {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_map_preserves_reason() {
        let outcome: Outcome<i64> = Outcome::Undefined(UndefinedReason::MissingValue);
        let mapped = outcome.map(|s| s as f64);
        assert_eq!(mapped.reason(), Some(UndefinedReason::MissingValue));
    }

    #[test]
    fn test_component_rows() {
        let columns = ComponentColumns {
            trend: vec![None, Some(3.0)],
            seasonal: vec![Some(-2.0), Some(2.0)],
            residual: vec![None, Some(0.0)],
        };
        assert_eq!(columns.len(), 2);
        let rows: Vec<_> = columns.rows().collect();
        assert_eq!(rows[1], (Some(3.0), Some(2.0), Some(0.0)));
    }

    #[test]
    fn test_reason_display() {
        let reason = UndefinedReason::InsufficientData {
            required: 8,
            actual: 5,
        };
        assert_eq!(reason.to_string(), "insufficient data (5 < 8)");
    }
}
