//! Domain definitions for kernel categorization.
//!
//! Domains group kernels by the kind of structure they measure and are used
//! for discovery in the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Analytical domain of a kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Domain {
    /// Monotonic trend statistics (Mann-Kendall).
    Trend,

    /// Seasonal decomposition and its derived strength features.
    Seasonality,

    /// Predictability metrics (Kaboudan).
    Predictability,
}

impl Domain {
    /// All available domains.
    pub const ALL: &'static [Domain] = &[Domain::Trend, Domain::Seasonality, Domain::Predictability];

    /// Returns the domain name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::Trend => "Trend",
            Domain::Seasonality => "Seasonality",
            Domain::Predictability => "Predictability",
        }
    }

    /// Parse a domain from its name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Trend" => Some(Domain::Trend),
            "Seasonality" => Some(Domain::Seasonality),
            "Predictability" => Some(Domain::Predictability),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_all_count() {
        assert_eq!(Domain::ALL.len(), 3);
    }

    #[test]
    fn test_domain_parse() {
        for domain in Domain::ALL {
            assert_eq!(Domain::parse(domain.as_str()), Some(*domain));
        }
        assert_eq!(Domain::parse("Unknown"), None);
    }

    #[test]
    fn test_domain_display() {
        assert_eq!(Domain::Seasonality.to_string(), "Seasonality");
    }
}
