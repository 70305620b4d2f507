//! Scaling of the feature matrix and the (log) target.
//!
//! [`ScalerState`] bundles the two independent standardizations used by the
//! training stage. It can only be fitted from a [`Partition<Train>`], so test
//! statistics never reach the fitted means and deviations.

mod standard;
mod target;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams};
pub use target::Log1pTransform;

use crate::dataset::split::{Partition, Train};
use crate::dataset::InMemoryDataset;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Serializable form of a [`ScalerState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalerStateParams {
    pub features: StandardScalerParams,
    pub target: StandardScalerParams,
}

/// Feature and target standardizations fitted on the training partition.
#[derive(Clone, Debug)]
pub struct ScalerState {
    features: FittedStandardScaler,
    target: FittedStandardScaler,
}

impl ScalerState {
    /// Fit both scalers on the training partition.
    ///
    /// The partition's targets are expected in log space (`log1p(price)`).
    pub fn fit(train: &Partition<Train>) -> Result<Self, PreprocessingError> {
        let features = StandardScaler::new().fit(train.features())?;
        let target = StandardScaler::new().fit(&as_column(train.targets()))?;
        Ok(Self { features, target })
    }

    /// The fitted feature scaler.
    pub fn features(&self) -> &FittedStandardScaler {
        &self.features
    }

    /// The fitted target scaler (one column, log space).
    pub fn target(&self) -> &FittedStandardScaler {
        &self.target
    }

    /// Standardize a raw feature matrix.
    pub fn transform_features(&self, x: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        self.features.transform(x)
    }

    /// Standardize log-space targets.
    pub fn transform_target(&self, y_log: &Array1<f64>) -> Result<Array1<f64>, PreprocessingError> {
        Ok(from_column(self.target.transform(&as_column(y_log))?))
    }

    /// Undo the target standardization, returning log-space values.
    pub fn inverse_target(&self, z: &Array1<f64>) -> Result<Array1<f64>, PreprocessingError> {
        Ok(from_column(self.target.inverse_transform(&as_column(z))?))
    }

    /// Map normalized log-price values back to currency units:
    /// `expm1(std_inverse(z))`.
    pub fn target_to_currency(&self, z: &Array1<f64>) -> Result<Array1<f64>, PreprocessingError> {
        let log = self.inverse_target(z)?;
        Log1pTransform.inverse_transform(&log)
    }

    /// Apply both forward transforms to a partition, producing a dataset the
    /// trainer can batch over.
    pub fn scale<S>(&self, partition: &Partition<S>) -> Result<InMemoryDataset, PreprocessingError> {
        let x = self.transform_features(partition.features())?;
        let y = self.transform_target(partition.targets())?;
        InMemoryDataset::new(x, y)
    }

    pub fn extract_params(&self) -> ScalerStateParams {
        ScalerStateParams {
            features: self.features.extract_params(),
            target: self.target.extract_params(),
        }
    }

    pub fn from_params(params: ScalerStateParams) -> Result<Self, PreprocessingError> {
        let target = FittedStandardScaler::from_params(params.target)?;
        if target.n_features_in() != 1 {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: 1,
                got_features: target.n_features_in(),
            });
        }
        Ok(Self {
            features: FittedStandardScaler::from_params(params.features)?,
            target,
        })
    }
}

fn as_column(y: &Array1<f64>) -> Array2<f64> {
    y.clone().insert_axis(Axis(1))
}

fn from_column(a: Array2<f64>) -> Array1<f64> {
    a.index_axis_move(Axis(1), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::split::train_test_split;
    use ndarray::array;

    fn split() -> (Partition<Train>, Partition<crate::dataset::split::Test>) {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| (i * (j + 1)) as f64);
        let prices = Array1::from_shape_fn(20, |i| 100_000.0 + 10_000.0 * i as f64);
        let y = Log1pTransform.transform(&prices).unwrap();
        train_test_split(x, y, 0.25, 7).unwrap()
    }

    #[test]
    fn test_scaler_state_fits_on_train_only() {
        let (train, test) = split();
        let state = ScalerState::fit(&train).unwrap();

        let expected = train.features().mean_axis(Axis(0)).unwrap();
        assert_eq!(state.features().mean(), &expected);

        // Replacing the test partition by wildly different data cannot move
        // the fitted statistics: fit never sees it.
        let poisoned = test.features().mapv(|v| v * 1e6 + 42.0);
        let refit = ScalerState::fit(&train).unwrap();
        assert_eq!(refit.features().mean(), state.features().mean());
        assert_eq!(refit.target().std(), state.target().std());
        assert!(state.transform_features(&poisoned).is_ok());
    }

    #[test]
    fn test_target_round_trip_to_currency() {
        let (train, _) = split();
        let state = ScalerState::fit(&train).unwrap();

        let z = state.transform_target(train.targets()).unwrap();
        let prices = state.target_to_currency(&z).unwrap();
        let expected = train.targets().mapv(f64::exp_m1);
        for (p, e) in prices.iter().zip(expected.iter()) {
            assert!((p - e).abs() < 1e-6, "{} vs {}", p, e);
        }
    }

    #[test]
    fn test_normalized_target_has_zero_mean() {
        let (train, _) = split();
        let state = ScalerState::fit(&train).unwrap();
        let z = state.transform_target(train.targets()).unwrap();
        assert!(z.mean().unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_scale_partition_into_dataset() {
        let (train, test) = split();
        let state = ScalerState::fit(&train).unwrap();
        let ds = state.scale(&test).unwrap();
        assert_eq!(ds.n_samples(), test.len());
        assert_eq!(ds.n_features(), 2);
    }

    #[test]
    fn test_params_round_trip() {
        let (train, _) = split();
        let state = ScalerState::fit(&train).unwrap();
        let restored = ScalerState::from_params(state.extract_params()).unwrap();
        let sample = array![[1.0, 2.0]];
        assert_eq!(
            state.transform_features(&sample).unwrap(),
            restored.transform_features(&sample).unwrap()
        );
    }
}
