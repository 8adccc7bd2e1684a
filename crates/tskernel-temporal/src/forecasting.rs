//! One-step-ahead forecast models.
//!
//! The predictability kernel only needs one capability from a model: fit on a
//! segment, then report the root-mean-square error of one-step-ahead
//! forecasts over a held-out tail. Parameters are estimated on the fit
//! segment alone; the forecast for `tail[t]` may use the history
//! `fit ++ tail[..t]` but never refits.

use std::fmt::Debug;

use tskernel_core::config::ForecastModelKind;

/// A forecast model usable by the predictability kernel.
pub trait ForecastModel: Send + Sync + Debug {
    /// Model name, for logging.
    fn name(&self) -> &'static str;

    /// Minimum fit-segment length the model can be estimated on.
    fn min_fit_len(&self) -> usize;

    /// RMSE of one-step-ahead forecasts over `tail`, with parameters fit on
    /// `fit`. Callers guarantee `fit.len() >= self.min_fit_len()` and a
    /// non-empty tail.
    fn one_step_rmse(&self, fit: &[f64], tail: &[f64]) -> f64;
}

/// Root-mean-square error between actual values and forecasts.
pub fn rmse(actual: &[f64], forecast: impl IntoIterator<Item = f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let ss: f64 = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    (ss / actual.len() as f64).sqrt()
}

// ============================================================================
// Mean Forecast
// ============================================================================

/// Constant forecast at the fit-segment mean.
///
/// The mean is accumulated in sorted order, so it does not depend on the
/// order of the fit segment at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanForecast;

impl MeanForecast {
    /// Order-independent mean.
    fn mean(values: &[f64]) -> f64 {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted.iter().sum::<f64>() / sorted.len() as f64
    }
}

impl ForecastModel for MeanForecast {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn min_fit_len(&self) -> usize {
        1
    }

    fn one_step_rmse(&self, fit: &[f64], tail: &[f64]) -> f64 {
        let mean = Self::mean(fit);
        rmse(tail, std::iter::repeat(mean))
    }
}

// ============================================================================
// Naive Forecast
// ============================================================================

/// Last observed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveForecast;

impl ForecastModel for NaiveForecast {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn min_fit_len(&self) -> usize {
        1
    }

    fn one_step_rmse(&self, fit: &[f64], tail: &[f64]) -> f64 {
        let Some(&last) = fit.last() else {
            return f64::NAN;
        };
        let forecasts = std::iter::once(last).chain(tail.iter().copied());
        rmse(tail, forecasts)
    }
}

// ============================================================================
// Autoregressive Forecast
// ============================================================================

/// AR(p) model fit by Yule-Walker.
#[derive(Debug, Clone, Copy)]
pub struct AutoRegressive {
    order: usize,
}

/// Fitted AR model.
#[derive(Debug, Clone, PartialEq)]
pub struct ArFit {
    /// Mean of the fit segment.
    pub mean: f64,
    /// Lag coefficients, `coefficients[j]` applies to lag `j + 1`.
    pub coefficients: Vec<f64>,
}

impl ArFit {
    /// One-step forecast from a history, most recent value last.
    pub fn predict_next(&self, history: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(history.iter().rev())
            .fold(self.mean, |acc, (phi, y)| acc + phi * (y - self.mean))
    }
}

impl AutoRegressive {
    /// Create an AR model of the given order (at least 1).
    pub fn new(order: usize) -> Self {
        Self {
            order: order.max(1),
        }
    }

    /// Number of lags.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Fit coefficients using Yule-Walker equations.
    pub fn fit(&self, series: &[f64]) -> ArFit {
        let p = self.order;
        let n = series.len();
        let mean = if n == 0 {
            0.0
        } else {
            series.iter().sum::<f64>() / n as f64
        };

        if n <= p {
            return ArFit {
                mean,
                coefficients: vec![0.0; p],
            };
        }

        let var: f64 = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        if var < 1e-10 {
            return ArFit {
                mean,
                coefficients: vec![0.0; p],
            };
        }

        let mut acf = vec![1.0; p + 1];
        for k in 1..=p {
            let cov: f64 = (0..n - k)
                .map(|i| (series[i] - mean) * (series[i + k] - mean))
                .sum::<f64>()
                / n as f64;
            acf[k] = cov / var;
        }

        ArFit {
            mean,
            coefficients: Self::levinson_durbin(&acf, p),
        }
    }

    /// Levinson-Durbin recursion for the Yule-Walker system.
    ///
    /// Stops early, keeping the lower-order solution, if the prediction
    /// error variance collapses.
    fn levinson_durbin(acf: &[f64], p: usize) -> Vec<f64> {
        let mut phi = vec![vec![0.0; p + 1]; p + 1];
        let mut sigma = vec![0.0; p + 1];
        sigma[0] = acf[0];

        let mut reached = 0;
        for k in 1..=p {
            if sigma[k - 1] <= f64::EPSILON {
                break;
            }

            let mut num = acf[k];
            for j in 1..k {
                num -= phi[k - 1][j] * acf[k - j];
            }
            phi[k][k] = num / sigma[k - 1];

            for j in 1..k {
                phi[k][j] = phi[k - 1][j] - phi[k][k] * phi[k - 1][k - j];
            }

            sigma[k] = sigma[k - 1] * (1.0 - phi[k][k].powi(2));
            reached = k;
        }

        (1..=p).map(|j| phi[reached][j]).collect()
    }
}

impl ForecastModel for AutoRegressive {
    fn name(&self) -> &'static str {
        "auto_regressive"
    }

    fn min_fit_len(&self) -> usize {
        self.order.saturating_mul(2).saturating_add(1)
    }

    fn one_step_rmse(&self, fit: &[f64], tail: &[f64]) -> f64 {
        let model = self.fit(fit);
        let mut history = Vec::with_capacity(fit.len() + tail.len());
        history.extend_from_slice(fit);

        let mut forecasts = Vec::with_capacity(tail.len());
        for &actual in tail {
            forecasts.push(model.predict_next(&history));
            history.push(actual);
        }
        rmse(tail, forecasts)
    }
}

// ============================================================================
// Configured Models
// ============================================================================

impl ForecastModel for ForecastModelKind {
    fn name(&self) -> &'static str {
        match self {
            ForecastModelKind::Mean => MeanForecast.name(),
            ForecastModelKind::Naive => NaiveForecast.name(),
            ForecastModelKind::AutoRegressive { order } => AutoRegressive::new(*order).name(),
        }
    }

    fn min_fit_len(&self) -> usize {
        match self {
            ForecastModelKind::Mean => MeanForecast.min_fit_len(),
            ForecastModelKind::Naive => NaiveForecast.min_fit_len(),
            ForecastModelKind::AutoRegressive { order } => AutoRegressive::new(*order).min_fit_len(),
        }
    }

    fn one_step_rmse(&self, fit: &[f64], tail: &[f64]) -> f64 {
        match self {
            ForecastModelKind::Mean => MeanForecast.one_step_rmse(fit, tail),
            ForecastModelKind::Naive => NaiveForecast.one_step_rmse(fit, tail),
            ForecastModelKind::AutoRegressive { order } => {
                AutoRegressive::new(*order).one_step_rmse(fit, tail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|t| (2.0 * std::f64::consts::PI * t as f64 / period).sin())
            .collect()
    }

    #[test]
    fn test_rmse() {
        assert_eq!(rmse(&[1.0, 3.0], [1.0, 1.0]), (2.0f64).sqrt());
        assert_eq!(rmse(&[], std::iter::empty()), 0.0);
    }

    #[test]
    fn test_mean_forecast_ignores_order() {
        let fit = [0.1, 0.7, 0.2, 1e-17, 3.3, -2.9];
        let mut reversed = fit;
        reversed.reverse();
        let tail = [0.5, -0.5];

        let a = MeanForecast.one_step_rmse(&fit, &tail);
        let b = MeanForecast.one_step_rmse(&reversed, &tail);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_naive_forecast() {
        // forecasts: 3 (last fit value), then 4, then 6
        let error = NaiveForecast.one_step_rmse(&[1.0, 3.0], &[4.0, 6.0, 6.0]);
        let expected = ((1.0 + 4.0 + 0.0) / 3.0f64).sqrt();
        assert!((error - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ar_fit_recovers_ar1() {
        // Deterministic AR(1)-like decay around a mean, restarted periodically.
        let mut series = Vec::new();
        for _ in 0..20 {
            let mut y = 10.0;
            for _ in 0..25 {
                series.push(y);
                y *= 0.8;
            }
        }
        let fit = AutoRegressive::new(1).fit(&series);
        assert_eq!(fit.coefficients.len(), 1);
        assert!(fit.coefficients[0] > 0.5 && fit.coefficients[0] < 1.0);
    }

    #[test]
    fn test_ar2_predicts_sine() {
        let series = sine(200, 20.0);
        let model = AutoRegressive::new(2);
        let error = model.one_step_rmse(&series[..160], &series[160..]);
        let baseline = MeanForecast.one_step_rmse(&series[..160], &series[160..]);
        assert!(error < 0.1 * baseline, "ar {} vs mean {}", error, baseline);
    }

    #[test]
    fn test_ar_constant_series() {
        let fit = AutoRegressive::new(3).fit(&[4.0; 30]);
        assert_eq!(fit.coefficients, vec![0.0; 3]);
        assert_eq!(fit.predict_next(&[4.0; 5]), 4.0);
    }

    #[test]
    fn test_configured_models() {
        let kind = ForecastModelKind::AutoRegressive { order: 3 };
        assert_eq!(kind.name(), "auto_regressive");
        assert_eq!(kind.min_fit_len(), 7);
        assert_eq!(ForecastModelKind::Mean.min_fit_len(), 1);
        assert_eq!(
            ForecastModelKind::AutoRegressive { order: usize::MAX / 2 + 1 }.min_fit_len(),
            usize::MAX
        );

        let series = sine(100, 10.0);
        assert_eq!(
            ForecastModelKind::Naive.one_step_rmse(&series[..80], &series[80..]),
            NaiveForecast.one_step_rmse(&series[..80], &series[80..])
        );
    }
}
