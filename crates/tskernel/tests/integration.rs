//! Integration tests for TSKernel
//!
//! These tests drive the kernels the way a host engine does: resolve once by
//! name, then call per group and assemble the results into columns.

use tskernel::core::traits::TypeErasedBatchKernel;
use tskernel::prelude::*;
use tskernel::temporal::messages::{
    KaboudanInput, KaboudanOutput, MannKendallInput, MannKendallOutput,
};

fn seasonal_series(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * (i % period) as f64 / period as f64;
            10.0 + 0.05 * i as f64 + 3.0 * phase.sin()
        })
        .collect()
}

// ============================================================================
// Catalog and Registry Tests
// ============================================================================

#[test]
fn test_catalog_domains() {
    let domains = tskernel::catalog::domains();
    assert_eq!(domains.len(), 3);

    let names: Vec<&str> = domains.iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["Trend", "Seasonality", "Predictability"]);

    for domain in &domains {
        assert!(!domain.description.is_empty());
        assert!(domain.kernel_count > 0, "{} has no kernels", domain.name);
    }
}

#[test]
fn test_registry_ids_are_stable() {
    let registry = tskernel::registry();
    for id in [
        "temporal/mann-kendall",
        "temporal/seasonal-decomposition",
        "temporal/trend-strength",
        "temporal/seasonal-strength",
        "temporal/residual-variance",
        "temporal/kaboudan",
    ] {
        assert!(registry.contains(id), "missing {}", id);
    }
}

#[test]
fn test_unknown_kernel_is_an_error() {
    let err = tskernel::registry()
        .resolve("temporal/does-not-exist")
        .unwrap_err();
    assert!(matches!(err, KernelError::KernelNotFound(_)));
}

#[test]
fn test_shape_mismatch_is_an_error() {
    let entry = tskernel::registry()
        .resolve(SeasonalDecomposition::ID)
        .unwrap();
    let values = [1.0, 2.0, 3.0, 4.0];
    let err = entry
        .call_scalar(&SequenceView::new(&values), &KernelConfig::new().with_period(2))
        .unwrap_err();
    assert!(matches!(err, KernelError::ShapeMismatch { .. }));
}

// ============================================================================
// Grouped Aggregation
// ============================================================================

#[test]
fn test_grouped_mann_kendall_column() {
    let entry = tskernel::registry().resolve(MannKendall::ID).unwrap();
    let config = KernelConfig::default();

    let groups: Vec<OwnedSequence> = vec![
        OwnedSequence::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        OwnedSequence::new(vec![5.0, 3.0, 1.0, 2.0, 4.0]),
        OwnedSequence::new(vec![7.0]),
        OwnedSequence::from_options(&[Some(1.0), None, Some(3.0)]),
        OwnedSequence::new(vec![]),
    ];

    let column: Vec<Outcome<f64>> = groups
        .iter()
        .map(|g| entry.call_scalar(&g.view().unwrap(), &config).unwrap())
        .collect();

    assert_eq!(column[0], Outcome::Value(1.0));
    match column[1] {
        Outcome::Value(v) => assert!((v + 0.2).abs() < 1e-12),
        other => panic!("expected a value, got {:?}", other),
    }
    assert_eq!(column[2], Outcome::insufficient(2, 1));
    assert_eq!(column[3], Outcome::Undefined(UndefinedReason::MissingValue));
    assert_eq!(column[4], Outcome::insufficient(2, 0));

    // Sentinels surface as NaN in the output column, never as zero.
    let floats: Vec<f64> = column.iter().map(Outcome::to_f64).collect();
    assert!(floats[2].is_nan() && floats[3].is_nan() && floats[4].is_nan());
}

#[test]
fn test_skip_policy_changes_effective_length() {
    let entry = tskernel::registry().resolve(MannKendall::ID).unwrap();
    let group = OwnedSequence::from_options(&[Some(1.0), None, Some(3.0)]);
    let config = KernelConfig::new().with_missing_policy(MissingPolicy::Skip);

    let statistic = entry.call_scalar(&group.view().unwrap(), &config).unwrap();
    assert_eq!(statistic, Outcome::Value(1.0));
}

#[test]
fn test_decomposition_rows() {
    let entry = tskernel::registry()
        .resolve(SeasonalDecomposition::ID)
        .unwrap();
    let values = [1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0];
    let config = KernelConfig::new().with_period(4);

    let columns = entry
        .call_decomposition(&SequenceView::new(&values), &config)
        .unwrap()
        .value()
        .unwrap();

    assert_eq!(columns.len(), values.len());
    for (i, (trend, seasonal, residual)) in columns.rows().enumerate() {
        let seasonal = seasonal.unwrap();
        let expected = if i % 2 == 0 { -2.0 } else { 2.0 };
        assert!((seasonal - expected).abs() < 1e-12);

        if (2..6).contains(&i) {
            assert!((trend.unwrap() - 3.0).abs() < 1e-12);
            assert!(residual.unwrap().abs() < 1e-12);
        } else {
            assert_eq!(trend, None);
            assert_eq!(residual, None);
        }
    }
}

#[test]
fn test_decomposition_short_group_and_bad_period() {
    let entry = tskernel::registry()
        .resolve(SeasonalDecomposition::ID)
        .unwrap();
    let values = seasonal_series(7, 4);

    let outcome = entry
        .call_decomposition(&SequenceView::new(&values), &KernelConfig::new().with_period(4))
        .unwrap();
    assert_eq!(outcome, Outcome::insufficient(8, 7));

    let err = entry
        .call_decomposition(&SequenceView::new(&values), &KernelConfig::new().with_period(1))
        .unwrap_err();
    assert!(matches!(err, KernelError::InvalidConfiguration(_)));
}

#[test]
fn test_strength_features_in_unit_interval() {
    let registry = tskernel::registry();
    let values = seasonal_series(96, 12);
    let config = KernelConfig::new().with_period(12);
    let seq = SequenceView::new(&values);

    for id in [
        DecompositionFeaturesKernel::TREND_STRENGTH_ID,
        DecompositionFeaturesKernel::SEASONAL_STRENGTH_ID,
    ] {
        let strength = registry
            .resolve(id)
            .unwrap()
            .call_scalar(&seq, &config)
            .unwrap()
            .value()
            .unwrap();
        assert!((0.0..=1.0).contains(&strength), "{} = {}", id, strength);
    }

    let seasonal = registry
        .resolve(DecompositionFeaturesKernel::SEASONAL_STRENGTH_ID)
        .unwrap()
        .call_scalar(&seq, &config)
        .unwrap()
        .value()
        .unwrap();
    assert!(seasonal > 0.9);
}

#[test]
fn test_kaboudan_requires_seed() {
    let entry = tskernel::registry().resolve(Kaboudan::ID).unwrap();
    let values = seasonal_series(50, 10);
    let err = entry
        .call_scalar(&SequenceView::new(&values), &KernelConfig::default())
        .unwrap_err();
    assert!(matches!(err, KernelError::InvalidConfiguration(_)));
}

#[test]
fn test_kaboudan_is_reproducible() {
    let entry = tskernel::registry().resolve(Kaboudan::ID).unwrap();
    let values = seasonal_series(120, 12);
    let config = KernelConfig::new()
        .with_seed(42)
        .with_forecast_model(ForecastModelKind::AutoRegressive { order: 2 });

    let first = entry.call_scalar(&SequenceView::new(&values), &config).unwrap();
    let second = entry.call_scalar(&SequenceView::new(&values), &config).unwrap();
    assert_eq!(first, second);

    let score = first.value().unwrap();
    assert!((0.0..=1.0).contains(&score));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_groups_match_sequential() {
    let registry = tskernel::registry();
    let groups: Vec<Vec<f64>> = (0..32)
        .map(|g| seasonal_series(8 + 7 * g, 4))
        .collect();
    let config = KernelConfig::new().with_period(4).with_seed(7);

    let ids = [
        MannKendall::ID,
        DecompositionFeaturesKernel::TREND_STRENGTH_ID,
        DecompositionFeaturesKernel::RESIDUAL_VARIANCE_ID,
        Kaboudan::ID,
    ];

    let evaluate = |group: &Vec<f64>| -> Vec<Outcome<f64>> {
        ids.iter()
            .map(|id| {
                registry
                    .resolve(id)
                    .unwrap()
                    .call_scalar(&SequenceView::new(group), &config)
                    .unwrap()
            })
            .collect()
    };

    let sequential: Vec<Vec<Outcome<f64>>> = groups.iter().map(evaluate).collect();

    let concurrent: Vec<Vec<Outcome<f64>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = groups
            .chunks(5)
            .map(|chunk| scope.spawn(move || chunk.iter().map(evaluate).collect::<Vec<_>>()))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(sequential, concurrent);
}

// ============================================================================
// Batch Execution
// ============================================================================

#[tokio::test]
async fn test_type_erased_mann_kendall() {
    let kernel: TypeErasedBatchKernel<MannKendall, MannKendallInput, MannKendallOutput> =
        TypeErasedBatchKernel::new(MannKendall::new());
    assert_eq!(kernel.id(), MannKendall::ID);

    let output = kernel
        .execute_dyn(br#"{"series":{"values":[1.0,2.0,3.0,4.0,5.0]}}"#)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["result"]["value"]["statistic"], 1.0);
    assert_eq!(json["result"]["value"]["n"], 5);
}

#[tokio::test]
async fn test_type_erased_group_with_missing_values() {
    let kernel: TypeErasedBatchKernel<MannKendall, MannKendallInput, MannKendallOutput> =
        TypeErasedBatchKernel::new(MannKendall::new());
    let series = OwnedSequence::from_options(&[Some(1.0), None, Some(3.0), Some(4.0)]);

    let skip = MannKendallInput::new(
        series.clone(),
        KernelConfig::new().with_missing_policy(MissingPolicy::Skip),
    );
    let output = kernel
        .execute_dyn(&serde_json::to_vec(&skip).unwrap())
        .await
        .unwrap();
    let output: MannKendallOutput = serde_json::from_slice(&output).unwrap();
    assert_eq!(output.result.value().unwrap().statistic, 1.0);

    let propagate = MannKendallInput::new(series, KernelConfig::default());
    let output = kernel
        .execute_dyn(&serde_json::to_vec(&propagate).unwrap())
        .await
        .unwrap();
    let output: MannKendallOutput = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        output.result.reason(),
        Some(UndefinedReason::MissingValue)
    );
}

#[tokio::test]
async fn test_type_erased_kaboudan_rejects_missing_seed() {
    let kernel: TypeErasedBatchKernel<Kaboudan, KaboudanInput, KaboudanOutput> =
        TypeErasedBatchKernel::new(Kaboudan::new());

    let err = kernel
        .execute_dyn(br#"{"series":{"values":[1.0,2.0,3.0,4.0,5.0,6.0]}}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::InvalidConfiguration(_)));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_drives_kernels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tskernel.toml");
    std::fs::write(
        &path,
        r#"
missing_policy = "skip"
period = 4
seed = 11
scramble_trials = 20

[forecast_model]
kind = "auto_regressive"
order = 1
"#,
    )
    .unwrap();

    let config = KernelConfig::from_file(&path).unwrap();
    assert_eq!(config.period, Some(4));
    assert_eq!(config.missing_policy, MissingPolicy::Skip);
    assert_eq!(
        config.forecast_model,
        ForecastModelKind::AutoRegressive { order: 1 }
    );
    assert_eq!(config.holdout_fraction, 0.2);

    let values = seasonal_series(40, 4);
    let score = tskernel::registry()
        .resolve(Kaboudan::ID)
        .unwrap()
        .call_scalar(&SequenceView::new(&values), &config)
        .unwrap();
    assert!(!score.is_undefined());
}

#[test]
fn test_malformed_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "period = \"monthly\"\n").unwrap();

    let err = KernelConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, KernelError::ConfigError(_)));
}
