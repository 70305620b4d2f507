//! Model-agnostic feature importance.

use crate::metrics::Metrics;
use crate::preprocessing::PreprocessingError;
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Increase in MAE when one feature column is shuffled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub mae_increase: f64,
}

/// Permutation importance of every column of `x`, sorted most important first.
///
/// At most `max_rows` rows (drawn with `seed`) are scored. `predict` must map a
/// feature matrix to predictions in the same units as `y`.
pub fn permutation_importance<F, E>(
    predict: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    feature_names: &[&str],
    max_rows: usize,
    seed: u64,
) -> Result<Vec<FeatureImportance>, E>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>, E>,
    E: From<PreprocessingError>,
{
    if x.nrows() != y.len() {
        return Err(PreprocessingError::InvalidShape {
            expected: format!("{} targets", x.nrows()),
            got: format!("{} targets", y.len()),
        }
        .into());
    }
    if feature_names.len() != x.ncols() {
        return Err(PreprocessingError::FeatureMismatch {
            expected_features: x.ncols(),
            got_features: feature_names.len(),
        }
        .into());
    }
    if x.nrows() == 0 || max_rows == 0 {
        return Err(PreprocessingError::EmptyData("no rows to score".to_string()).into());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows: Vec<usize> = (0..x.nrows()).collect();
    rows.shuffle(&mut rng);
    rows.truncate(max_rows);
    let x = x.select(Axis(0), &rows);
    let y = y.select(Axis(0), &rows);
    let y_true = y.to_vec();

    let baseline = Metrics::mae(&y_true, &predict(&x)?.to_vec());

    let mut importances = Vec::with_capacity(x.ncols());
    for (j, name) in feature_names.iter().enumerate() {
        let mut column: Vec<f64> = x.column(j).to_vec();
        column.shuffle(&mut rng);
        let mut permuted = x.clone();
        permuted.column_mut(j).assign(&Array1::from(column));
        let mae = Metrics::mae(&y_true, &predict(&permuted)?.to_vec());
        debug!(feature = *name, baseline, mae, "permuted feature");
        importances.push(FeatureImportance {
            feature: name.to_string(),
            mae_increase: mae - baseline,
        });
    }

    importances.sort_by(|a, b| b.mae_increase.total_cmp(&a.mae_increase));
    Ok(importances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_used_feature_matters() {
        // prediction depends only on column 1
        let x = Array2::from_shape_fn((50, 3), |(i, j)| ((i * (j + 3)) % 17) as f64);
        let y = x.column(1).mapv(|v| 10.0 * v);
        let predict = |m: &Array2<f64>| -> Result<Array1<f64>, PreprocessingError> { Ok(m.column(1).mapv(|v| 10.0 * v)) };

        let result = permutation_importance(predict, &x, &y, &["a", "b", "c"], 250, 7).unwrap();
        assert_eq!(result[0].feature, "b");
        assert!(result[0].mae_increase > 0.0);
        for other in &result[1..] {
            assert_eq!(other.mae_increase, 0.0);
        }
    }

    #[test]
    fn test_name_count_must_match() {
        let x = Array2::<f64>::zeros((4, 2));
        let y = Array1::<f64>::zeros(4);
        let predict = |m: &Array2<f64>| -> Result<Array1<f64>, PreprocessingError> { Ok(Array1::zeros(m.nrows())) };
        assert!(matches!(
            permutation_importance(predict, &x, &y, &["only"], 10, 0),
            Err(PreprocessingError::FeatureMismatch { .. })
        ));
    }
}
