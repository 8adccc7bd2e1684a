//! Kernel metadata.
//!
//! Every kernel carries a [`KernelMetadata`] record: its stable identifier,
//! its domain, and the shape of the result it writes back per group.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the result a kernel produces for one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputShape {
    /// One floating-point value per group.
    Scalar,

    /// Three aligned sequences per group (one row per input position).
    Decomposition,
}

impl OutputShape {
    /// Returns the shape name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputShape::Scalar => "scalar",
            OutputShape::Decomposition => "decomposition",
        }
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kernel metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KernelMetadata {
    /// Stable kernel identifier (e.g., "temporal/mann-kendall").
    pub id: String,

    /// Result shape.
    pub shape: OutputShape,

    /// Analytical domain.
    pub domain: Domain,

    /// Human-readable description.
    pub description: String,

    /// Expected throughput in groups per second for groups of ~1k points.
    pub expected_throughput: u64,

    /// Target latency per group in microseconds.
    pub target_latency_us: f64,

    /// Version of the kernel implementation.
    pub version: u32,
}

impl KernelMetadata {
    /// Metadata for a kernel returning one value per group.
    #[must_use]
    pub fn scalar(id: impl Into<String>, domain: Domain) -> Self {
        Self::with_shape(id, domain, OutputShape::Scalar)
    }

    /// Metadata for a kernel returning aligned component sequences.
    #[must_use]
    pub fn decomposition(id: impl Into<String>, domain: Domain) -> Self {
        Self::with_shape(id, domain, OutputShape::Decomposition)
    }

    fn with_shape(id: impl Into<String>, domain: Domain, shape: OutputShape) -> Self {
        Self {
            id: id.into(),
            shape,
            domain,
            description: String::new(),
            expected_throughput: 10_000,
            target_latency_us: 50.0,
            version: 1,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the expected throughput.
    #[must_use]
    pub fn with_throughput(mut self, groups_per_sec: u64) -> Self {
        self.expected_throughput = groups_per_sec;
        self
    }

    /// Set the target latency.
    #[must_use]
    pub fn with_latency_us(mut self, latency_us: f64) -> Self {
        self.target_latency_us = latency_us;
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// PascalCase name derived from the last id segment, for hosts that
    /// register functions by name (e.g. "temporal/mann-kendall" -> "MannKendall").
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.id.rsplit('/').next().unwrap_or(&self.id);
        to_pascal_case(name)
    }
}

/// Convert a kebab-case or snake_case string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split(|c| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_metadata() {
        let meta = KernelMetadata::scalar("temporal/mann-kendall", Domain::Trend)
            .with_description("Mann-Kendall trend statistic")
            .with_throughput(200_000)
            .with_latency_us(5.0);

        assert_eq!(meta.id, "temporal/mann-kendall");
        assert_eq!(meta.shape, OutputShape::Scalar);
        assert_eq!(meta.domain, Domain::Trend);
        assert_eq!(meta.expected_throughput, 200_000);
    }

    #[test]
    fn test_decomposition_metadata() {
        let meta = KernelMetadata::decomposition("temporal/seasonal-decomposition", Domain::Seasonality);
        assert_eq!(meta.shape, OutputShape::Decomposition);
        assert_eq!(meta.version, 1);
    }

    #[test]
    fn test_display_name() {
        let meta = KernelMetadata::scalar("temporal/mann-kendall", Domain::Trend);
        assert_eq!(meta.display_name(), "MannKendall");

        let meta = KernelMetadata::scalar("kaboudan", Domain::Predictability);
        assert_eq!(meta.display_name(), "Kaboudan");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("seasonal-decomposition"), "SeasonalDecomposition");
        assert_eq!(to_pascal_case("snake_case"), "SnakeCase");
        assert_eq!(to_pascal_case("mixed-snake_case"), "MixedSnakeCase");
    }
}
