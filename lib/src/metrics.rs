//! Regression metrics in the target's own units.

use crate::trainer::TrainingHistory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error.
    ///
    /// MSE = mean((y_true - y_pred)^2)
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        sum_sq / y_true.len() as f64
    }

    /// Root Mean Squared Error, in the same units as the target.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// Mean Absolute Error.
    ///
    /// MAE = mean(|y_true - y_pred|)
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_abs: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).abs())
            .sum();

        sum_abs / y_true.len() as f64
    }

    /// Coefficient of determination.
    ///
    /// R² = 1 - (SS_res / SS_tot)
    ///
    /// Negative when the model is worse than predicting the mean. A constant
    /// target gives 1 for a perfect fit and 0 otherwise.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - (ss_res / ss_tot)
    }

    /// Mean Absolute Percentage Error, in percent.
    ///
    /// MAPE = 100 · mean(|y_true - y_pred| / |y_true|)
    ///
    /// A row with `y_true == 0` contributes 0 when the prediction is also 0
    /// and makes the result infinite otherwise.
    pub fn mape(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let sum: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| match (t == 0.0, p == t) {
                (_, true) => 0.0,
                (true, false) => f64::INFINITY,
                (false, false) => ((t - p) / t).abs(),
            })
            .sum();

        100.0 * sum / y_true.len() as f64
    }

    /// Symmetric Mean Absolute Percentage Error, in percent, bounded to [0, 200].
    ///
    /// sMAPE = 100 · mean(2 |y_true - y_pred| / (|y_true| + |y_pred|))
    ///
    /// Rows where both values are 0 contribute 0.
    pub fn smape(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let sum: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| {
                let denom = t.abs() + p.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    2.0 * (t - p).abs() / denom
                }
            })
            .sum();

        100.0 * sum / y_true.len() as f64
    }

    /// Calculate all metrics at once.
    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
        RegressionMetrics {
            mse: Self::mse(y_true, y_pred),
            rmse: Self::rmse(y_true, y_pred),
            mae: Self::mae(y_true, y_pred),
            r_squared: Self::r_squared(y_true, y_pred),
            mape: Self::mape(y_true, y_pred),
            smape: Self::smape(y_true, y_pred),
        }
    }
}

/// All regression metrics for one partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
    /// Percent.
    pub mape: f64,
    /// Percent.
    pub smape: f64,
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE {:.2}, RMSE {:.2}, R² {:.4}, MAPE {:.2} %, sMAPE {:.2} %",
            self.mae, self.rmse, self.r_squared, self.mape, self.smape
        )
    }
}

/// Per-partition metrics in currency units plus the loss curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
    pub history: TrainingHistory,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "train: {}", self.train)?;
        write!(f, "test:  {}", self.test)?;
        if let Some(best) = self.history.best_epoch {
            write!(f, "\nbest epoch: {} of {}", best, self.history.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_error() {
        let y_true = vec![1.0, 2.0, 3.0, 4.0];
        let y_pred = vec![2.0, 3.0, 4.0, 5.0];
        assert!((Metrics::mse(&y_true, &y_pred) - 1.0).abs() < 1e-12);
        assert!((Metrics::rmse(&y_true, &y_pred) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mae() {
        let y_true = vec![1.0, 2.0, 3.0, 4.0];
        let y_pred = vec![2.0, 1.0, 4.0, 5.0];
        assert!((Metrics::mae(&y_true, &y_pred) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_constant_target() {
        let y = vec![2.0, 2.0, 2.0, 2.0];
        assert_eq!(Metrics::r_squared(&y, &y), 1.0);
        assert_eq!(Metrics::r_squared(&y, &[2.0, 2.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_r_squared_mean_predictor_is_zero() {
        let y_true = vec![1.0, 2.0, 3.0];
        let y_pred = vec![2.0, 2.0, 2.0];
        assert!(Metrics::r_squared(&y_true, &y_pred).abs() < 1e-12);
    }

    #[test]
    fn test_mape_percent() {
        // |100-110|/100 = 0.1, |200-150|/200 = 0.25 -> mean 0.175
        let mape = Metrics::mape(&[100.0, 200.0], &[110.0, 150.0]);
        assert!((mape - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_mape_zero_actual() {
        assert_eq!(Metrics::mape(&[0.0, 100.0], &[0.0, 100.0]), 0.0);
        assert!(Metrics::mape(&[0.0, 100.0], &[1.0, 100.0]).is_infinite());
    }

    #[test]
    fn test_smape_bounds() {
        assert_eq!(Metrics::smape(&[0.0], &[0.0]), 0.0);
        // opposite signs or one side zero hit the upper bound
        assert!((Metrics::smape(&[0.0], &[5.0]) - 200.0).abs() < 1e-12);
        let s = Metrics::smape(&[100.0, 300.0], &[120.0, 250.0]);
        assert!((0.0..=200.0).contains(&s));
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![150_000.0, 320_000.0, 899_999.0];
        let m = Metrics::calculate_all(&y, &y);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mape, 0.0);
        assert_eq!(m.smape, 0.0);
        assert_eq!(m.r_squared, 1.0);
    }

    #[test]
    fn test_empty_inputs() {
        let m = Metrics::calculate_all(&[], &[]);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.smape, 0.0);
    }

    #[test]
    #[should_panic(expected = "Arrays must have the same length")]
    fn test_length_mismatch_panics() {
        Metrics::mae(&[1.0], &[1.0, 2.0]);
    }

    #[test]
    fn test_display() {
        let m = Metrics::calculate_all(&[100.0], &[110.0]);
        let text = m.to_string();
        assert!(text.contains("MAE 10.00"));
        assert!(text.contains("MAPE 10.00 %"));
    }
}
