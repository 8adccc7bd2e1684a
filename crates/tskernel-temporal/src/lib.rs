//! # TSKernel Temporal
//!
//! Per-sequence time-series kernels. Each kernel takes one group's ordered
//! values and the shared configuration and returns a value or the typed
//! undefined sentinel.
//!
//! ## Kernels
//!
//! ### Trend (1 kernel)
//! - `MannKendall` - Mann-Kendall statistic via `O(n log n)` pair counting
//!
//! ### Seasonality (4 kernels)
//! - `SeasonalDecomposition` - Classical additive/multiplicative decomposition
//! - `trend-strength`, `seasonal-strength`, `residual-variance` - Strength
//!   features of the decomposition
//!
//! ### Predictability (1 kernel)
//! - `Kaboudan` - Block-scrambling predictability score

#![warn(missing_docs)]

pub mod decomposition;
pub mod features;
pub mod forecasting;
pub mod messages;
pub mod predictability;
pub mod rank_order;
pub mod trend;
pub mod types;

pub use decomposition::SeasonalDecomposition;
pub use features::DecompositionFeaturesKernel;
pub use forecasting::{AutoRegressive, ForecastModel, MeanForecast, NaiveForecast};
pub use predictability::Kaboudan;
pub use rank_order::RankOrderEngine;
pub use trend::MannKendall;
pub use types::{
    DecompositionFeatures, DecompositionResult, KaboudanResult, MannKendallResult, PairCounts,
};

use tskernel_core::registry::KernelRegistryBuilder;

/// Register all temporal kernels.
pub fn register_all(builder: KernelRegistryBuilder) -> KernelRegistryBuilder {
    tracing::debug!("Registering temporal kernels");

    let [trend_strength, seasonal_strength, residual_variance] =
        DecompositionFeaturesKernel::scalar_metadata();

    builder
        .with_scalar(MannKendall::kernel_metadata(), trend::mann_kendall)
        .with_decomposition(
            SeasonalDecomposition::kernel_metadata(),
            decomposition::seasonal_decomposition,
        )
        .with_scalar(trend_strength, features::trend_strength)
        .with_scalar(seasonal_strength, features::seasonal_strength)
        .with_scalar(residual_variance, features::residual_variance_kernel)
        .with_scalar(Kaboudan::kernel_metadata(), predictability::kaboudan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tskernel_core::config::KernelConfig;
    use tskernel_core::domain::Domain;
    use tskernel_core::registry::KernelRegistry;
    use tskernel_core::sequence::SequenceView;

    #[test]
    fn test_register_all() {
        let registry = register_all(KernelRegistry::builder()).build().unwrap();
        assert_eq!(
            registry.ids(),
            vec![
                "temporal/kaboudan",
                "temporal/mann-kendall",
                "temporal/residual-variance",
                "temporal/seasonal-decomposition",
                "temporal/seasonal-strength",
                "temporal/trend-strength",
            ]
        );
        assert_eq!(registry.stats().decomposition_kernels, 1);
        assert_eq!(registry.by_domain(Domain::Seasonality).len(), 4);
    }

    #[test]
    fn test_registered_functions_match_kernels() {
        let registry = register_all(KernelRegistry::builder()).build().unwrap();
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let seq = SequenceView::new(&values);
        let config = KernelConfig::default();

        let statistic = registry
            .resolve(MannKendall::ID)
            .unwrap()
            .call_scalar(&seq, &config)
            .unwrap();
        assert_eq!(statistic, MannKendall::compute(&seq, &config).map(|r| r.statistic));
    }

    #[test]
    fn test_registering_twice_fails() {
        let builder = register_all(register_all(KernelRegistry::builder()));
        assert!(builder.build().is_err());
    }
}
