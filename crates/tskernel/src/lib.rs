//! # TSKernel
//!
//! Per-group time-series statistics for columnar query engines.
//!
//! A host engine groups rows, hands each group's ordered values to a kernel
//! as a [`SequenceView`](tskernel_core::sequence::SequenceView), and writes
//! the result back into an output column. Kernels are plain functions,
//! resolved once by stable name from a static registration table, and safe
//! to call from any number of worker threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use tskernel::prelude::*;
//!
//! let registry = tskernel::registry();
//! let mann_kendall = registry.resolve("temporal/mann-kendall")?;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let statistic = mann_kendall.call_scalar(&SequenceView::new(&values), &KernelConfig::default())?;
//! assert_eq!(statistic, Outcome::Value(1.0));
//! # Ok::<(), KernelError>(())
//! ```
//!
//! ## Domains
//!
//! - **Trend**: Mann-Kendall statistic
//! - **Seasonality**: classical decomposition and its strength features
//! - **Predictability**: Kaboudan block-scrambling score

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::OnceLock;

use tskernel_core::error::Result;
use tskernel_core::registry::KernelRegistry;

// Re-export core crate
pub use tskernel_core as core;

// Domain re-exports
pub use tskernel_temporal as temporal;

/// Prelude module for convenient imports.
///
/// Import everything you need with:
/// ```rust,ignore
/// use tskernel::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tskernel_core::prelude::*;

    // Kernels
    pub use tskernel_temporal::{
        AutoRegressive, DecompositionFeaturesKernel, ForecastModel, Kaboudan, MannKendall,
        MeanForecast, NaiveForecast, RankOrderEngine, SeasonalDecomposition,
    };
}

static REGISTRY: OnceLock<KernelRegistry> = OnceLock::new();

/// Build a fresh registry holding every kernel in the workspace.
pub fn build_registry() -> Result<KernelRegistry> {
    tskernel_temporal::register_all(KernelRegistry::builder()).build()
}

/// Process-wide registry, built on first use.
///
/// If the table cannot be built the failure is logged and an empty
/// registry is installed, so every lookup reports `KernelNotFound`.
pub fn registry() -> &'static KernelRegistry {
    REGISTRY.get_or_init(|| {
        build_registry().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build kernel registry");
            KernelRegistry::default()
        })
    })
}

/// Kernel catalog.
pub mod catalog {
    use tskernel_core::domain::Domain;

    /// Domain information.
    #[derive(Debug, Clone)]
    pub struct DomainInfo {
        /// Domain enum value.
        pub domain: Domain,
        /// Human-readable name.
        pub name: &'static str,
        /// Description.
        pub description: &'static str,
        /// Number of registered kernels.
        pub kernel_count: usize,
    }

    /// Get all domain information.
    pub fn domains() -> Vec<DomainInfo> {
        let registry = crate::registry();
        Domain::ALL
            .iter()
            .map(|&domain| DomainInfo {
                domain,
                name: domain.as_str(),
                description: description(domain),
                kernel_count: registry.by_domain(domain).len(),
            })
            .collect()
    }

    /// Total number of registered kernels.
    pub fn total_kernel_count() -> usize {
        crate::registry().len()
    }

    fn description(domain: Domain) -> &'static str {
        match domain {
            Domain::Trend => "Monotonic trend statistics",
            Domain::Seasonality => "Seasonal decomposition and strength features",
            Domain::Predictability => "Order-dependence of forecast skill",
            _ => "",
        }
    }
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _domain = Domain::Trend;
        let _shape = OutputShape::Decomposition;
        let _config = KernelConfig::default();
    }

    #[test]
    fn test_registry_is_shared() {
        assert!(std::ptr::eq(registry(), registry()));
        assert_eq!(registry().len(), 6);
    }

    #[test]
    fn test_catalog() {
        let domains = catalog::domains();
        assert_eq!(domains.len(), 3);
        assert!(domains.iter().all(|d| d.kernel_count > 0));
        assert_eq!(catalog::total_kernel_count(), 6);
    }

    #[test]
    fn test_version() {
        assert!(!version::VERSION.is_empty());
    }
}
