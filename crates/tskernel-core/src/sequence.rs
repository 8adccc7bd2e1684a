//! Read-only sequence views.
//!
//! A [`SequenceView`] is the input every kernel receives: one group's values in
//! host emission order, borrowed without copying, plus an optional validity
//! mask. A position is missing when its mask bit is `false` or when its value
//! is `NaN`.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::MissingPolicy;
use crate::error::{KernelError, Result};

/// Borrowed, ordered view over one group's numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceView<'a> {
    values: &'a [f64],
    validity: Option<&'a [bool]>,
}

impl<'a> SequenceView<'a> {
    /// Wrap a value buffer. `NaN` entries count as missing.
    #[must_use]
    pub fn new(values: &'a [f64]) -> Self {
        Self {
            values,
            validity: None,
        }
    }

    /// Wrap a value buffer together with an Arrow-style validity mask
    /// (`true` means present).
    pub fn with_validity(values: &'a [f64], validity: &'a [bool]) -> Result<Self> {
        if values.len() != validity.len() {
            return Err(KernelError::ValidityLengthMismatch {
                values: values.len(),
                validity: validity.len(),
            });
        }
        Ok(Self {
            values,
            validity: Some(validity),
        })
    }

    /// A view of length zero.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            values: &[],
            validity: None,
        }
    }

    /// Number of positions, missing ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the view has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if position `i` is missing. Out-of-range positions are
    /// reported as missing.
    #[must_use]
    pub fn is_missing(&self, i: usize) -> bool {
        match self.values.get(i) {
            Some(v) => v.is_nan() || self.validity.is_some_and(|mask| !mask[i]),
            None => true,
        }
    }

    /// Value at position `i`, or `None` if it is missing or out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        if self.is_missing(i) {
            None
        } else {
            Some(self.values[i])
        }
    }

    /// Iterate over all positions in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Number of missing positions.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Returns true if any position is missing.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        (0..self.len()).any(|i| self.is_missing(i))
    }

    /// Apply a missing-value policy.
    ///
    /// Under [`MissingPolicy::Propagate`] any missing position taints the
    /// whole group. Under [`MissingPolicy::Skip`] missing positions are
    /// dropped and the remaining values keep their relative order. The buffer
    /// is only copied when something had to be removed.
    #[must_use]
    pub fn resolve(&self, policy: MissingPolicy) -> Resolved<'a> {
        if !self.has_missing() {
            return Resolved::Values(Cow::Borrowed(self.values));
        }
        match policy {
            MissingPolicy::Propagate => Resolved::Tainted,
            MissingPolicy::Skip => Resolved::Values(Cow::Owned(self.iter().flatten().collect())),
        }
    }
}

impl<'a> From<&'a [f64]> for SequenceView<'a> {
    fn from(values: &'a [f64]) -> Self {
        Self::new(values)
    }
}

impl<'a> From<Option<&'a [f64]>> for SequenceView<'a> {
    fn from(values: Option<&'a [f64]>) -> Self {
        values.map_or_else(Self::empty, Self::new)
    }
}

/// A sequence after its missing-value policy has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// Present values in emission order.
    Values(Cow<'a, [f64]>),
    /// A missing value was found under the `Propagate` policy.
    Tainted,
}

/// Owned sequence used in serialized kernel messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedSequence {
    /// Values in emission order. `NaN` is written as `null`, and `null` is
    /// read back as a missing position.
    #[serde(deserialize_with = "deserialize_nullable_values")]
    pub values: Vec<f64>,
    /// Optional validity mask (`true` means present).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<Vec<bool>>,
}

impl OwnedSequence {
    /// Create from values only.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            validity: None,
        }
    }

    /// Create from optional values; `None` entries become missing.
    ///
    /// Missing positions hold a finite placeholder under a `false` validity
    /// bit, so the buffer serializes as plain numbers.
    pub fn from_options(values: &[Option<f64>]) -> Self {
        Self {
            values: values.iter().map(|v| v.unwrap_or(0.0)).collect(),
            validity: Some(values.iter().map(Option::is_some).collect()),
        }
    }

    /// Borrow as a view.
    pub fn view(&self) -> Result<SequenceView<'_>> {
        match &self.validity {
            Some(mask) => SequenceView::with_validity(&self.values, mask),
            None => Ok(SequenceView::new(&self.values)),
        }
    }
}

fn deserialize_nullable_values<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_buffer_is_empty() {
        let view = SequenceView::from(None);
        assert_eq!(view.len(), 0);
        assert!(view.is_empty());
        assert!(!view.has_missing());
    }

    #[test]
    fn test_nan_and_mask_are_missing() {
        let values = [1.0, f64::NAN, 3.0, 4.0];
        let mask = [true, true, false, true];
        let view = SequenceView::with_validity(&values, &mask).unwrap();

        assert_eq!(view.get(0), Some(1.0));
        assert_eq!(view.get(1), None);
        assert_eq!(view.get(2), None);
        assert_eq!(view.get(3), Some(4.0));
        assert_eq!(view.get(4), None);
        assert_eq!(view.missing_count(), 2);
    }

    #[test]
    fn test_mask_length_mismatch() {
        let values = [1.0, 2.0];
        let mask = [true];
        let err = SequenceView::with_validity(&values, &mask).unwrap_err();
        assert!(matches!(
            err,
            KernelError::ValidityLengthMismatch {
                values: 2,
                validity: 1
            }
        ));
    }

    #[test]
    fn test_resolve_policies() {
        let values = [5.0, f64::NAN, 1.0];
        let view = SequenceView::new(&values);

        assert_eq!(view.resolve(MissingPolicy::Propagate), Resolved::Tainted);
        match view.resolve(MissingPolicy::Skip) {
            Resolved::Values(v) => assert_eq!(v.as_ref(), &[5.0, 1.0]),
            Resolved::Tainted => panic!("skip must not taint"),
        }
    }

    #[test]
    fn test_resolve_borrows_when_complete() {
        let values = [1.0, 2.0, 3.0];
        let view = SequenceView::new(&values);
        match view.resolve(MissingPolicy::Propagate) {
            Resolved::Values(Cow::Borrowed(v)) => assert_eq!(v, &values),
            other => panic!("expected borrowed values, got {:?}", other),
        }
    }

    #[test]
    fn test_owned_sequence_from_options() {
        let owned = OwnedSequence::from_options(&[Some(1.0), None, Some(2.0)]);
        let view = owned.view().unwrap();
        assert_eq!(view.len(), 3);
        assert!(view.is_missing(1));
        assert_eq!(view.iter().collect::<Vec<_>>(), vec![Some(1.0), None, Some(2.0)]);
    }

    #[test]
    fn test_owned_sequence_json_keeps_missing_positions() {
        let owned = OwnedSequence::from_options(&[Some(1.0), None, Some(3.0), Some(4.0)]);
        let json = serde_json::to_string(&owned).unwrap();
        assert!(!json.contains("null"));

        let back: OwnedSequence = serde_json::from_str(&json).unwrap();
        let view = back.view().unwrap();
        assert_eq!(view.iter().collect::<Vec<_>>(), vec![Some(1.0), None, Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_null_values_read_as_missing() {
        let nan = OwnedSequence::new(vec![2.0, f64::NAN]);
        let json = serde_json::to_string(&nan).unwrap();
        assert_eq!(json, r#"{"values":[2.0,null]}"#);

        let back: OwnedSequence = serde_json::from_str(&json).unwrap();
        let view = back.view().unwrap();
        assert_eq!(view.get(0), Some(2.0));
        assert!(view.is_missing(1));
    }
}
