use crate::error::PipelineError;
use crate::model::linear::SerializableLinearParams;
use crate::model::mlp::SerializableFeedForwardParams;
use crate::model::{FeedForwardModel, Fitted, InferenceModel, LinearModel};
use crate::preprocessing::{FittedTransformer, PreprocessingError, ScalerState, ScalerStateParams};
use crate::serialization::SerializableParams;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A trained regressor of either supported kind.
#[derive(Clone, Debug)]
pub enum FittedRegressor {
    FeedForward(FeedForwardModel<Fitted>),
    Linear(LinearModel<Fitted>),
}

impl FittedRegressor {
    /// Normalized log-price predictions for standardized features.
    pub fn predict_batch(&self, x: &Array2<f64>) -> Array1<f64> {
        match self {
            FittedRegressor::FeedForward(m) => m.predict_batch(x),
            FittedRegressor::Linear(m) => m.predict_batch(x),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            FittedRegressor::FeedForward(m) => m.n_features(),
            FittedRegressor::Linear(m) => m.n_features(),
        }
    }

    pub fn extract_params(&self) -> RegressorParams {
        match self {
            FittedRegressor::FeedForward(m) => RegressorParams::FeedForward(m.extract_params()),
            FittedRegressor::Linear(m) => RegressorParams::Linear(m.extract_params()),
        }
    }

    pub fn from_params(params: RegressorParams) -> Result<Self, PipelineError> {
        Ok(match params {
            RegressorParams::FeedForward(p) => FittedRegressor::FeedForward(FeedForwardModel::<Fitted>::from_params(p)?),
            RegressorParams::Linear(p) => FittedRegressor::Linear(LinearModel::<Fitted>::from_params(p)?),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RegressorParams {
    FeedForward(SerializableFeedForwardParams),
    Linear(SerializableLinearParams),
}

/// Everything needed to price a raw feature matrix, in serializable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimatorParams {
    pub scalers: ScalerStateParams,
    pub regressor: RegressorParams,
}

/// Fitted scalers plus the trained regressor: raw features in, prices out.
#[derive(Clone, Debug)]
pub struct PriceEstimator {
    scalers: ScalerState,
    regressor: FittedRegressor,
}

impl PriceEstimator {
    pub fn new(scalers: ScalerState, regressor: FittedRegressor) -> Self {
        Self { scalers, regressor }
    }

    pub fn scalers(&self) -> &ScalerState {
        &self.scalers
    }

    pub fn regressor(&self) -> &FittedRegressor {
        &self.regressor
    }

    /// Prices for unscaled feature rows (the 12 feature-table columns).
    pub fn predict_prices(&self, features: &Array2<f64>) -> Result<Array1<f64>, PreprocessingError> {
        if features.ncols() != self.regressor.n_features() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.regressor.n_features(),
                got_features: features.ncols(),
            });
        }
        let scaled = self.scalers.transform_features(features)?;
        let z = self.regressor.predict_batch(&scaled);
        self.scalers.target_to_currency(&z)
    }

    pub fn extract_params(&self) -> PriceEstimatorParams {
        PriceEstimatorParams {
            scalers: self.scalers.extract_params(),
            regressor: self.regressor.extract_params(),
        }
    }

    pub fn from_params(params: PriceEstimatorParams) -> Result<Self, PipelineError> {
        let scalers = ScalerState::from_params(params.scalers)?;
        let regressor = FittedRegressor::from_params(params.regressor)?;
        if scalers.features().n_features_in() != regressor.n_features() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: scalers.features().n_features_in(),
                got_features: regressor.n_features(),
            }
            .into());
        }
        Ok(Self::new(scalers, regressor))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let bytes = self.extract_params().to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path)?;
        Self::from_params(PriceEstimatorParams::from_bytes(&bytes)?)
    }
}
