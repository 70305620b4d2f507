//! Regression models with compile-time training state.
//!
//! - [`TrainableModel`]: forward/backward passes used by the trainer.
//! - [`InferenceModel`]: prediction and persistence of a fitted model.
//! - [`ParamOps`]: element-wise arithmetic over a parameter set, used by
//!   the optimizers.

pub mod linear;
pub mod mlp;
pub mod state;

pub use linear::{LinearModel, LinearParams, LinearRegression};
pub use mlp::{FeedForwardConfig, FeedForwardModel, FeedForwardNetwork, FeedForwardParams, HiddenLayer};
pub use state::{Fitted, Unfitted};

use crate::serialization::SerializableParams;
use ndarray::{Array1, Array2};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid model parameters: {0}")]
    InvalidParams(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for ModelError {
    fn from(err: bincode::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

pub trait TrainableModel {
    type Params: ParamOps;
    type Output: InferenceModel;

    /// Training-mode forward pass. May apply dropout and caches what
    /// `backward` needs.
    fn forward(&mut self, input: &Array2<f64>) -> Array1<f64>;

    /// Deterministic forward pass without caching (validation loss).
    fn predict_eval(&self, input: &Array2<f64>) -> Array1<f64>;

    /// Gradients of the loss w.r.t. every parameter, given ∂L/∂pred for the
    /// batch last passed to `forward`. Call `forward` on `input` first;
    /// models that cache activations recompute them when `input` differs.
    fn backward(&self, input: &Array2<f64>, grad_output: &Array1<f64>) -> Self::Params;

    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: Self::Params);

    fn into_fitted(self) -> Self::Output;
}

pub trait ParamOps: Clone {
    /// Apply `f` to every scalar parameter.
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self;

    /// Combine two structurally identical parameter sets element-wise.
    fn zip_map<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self;

    fn add(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a + b)
    }

    fn scale(&self, scalar: f64) -> Self {
        self.map(|a| a * scalar)
    }
}

pub trait InferenceModel: Sized {
    /// Serializable representation of the parameters.
    type ParamsRepr: SerializableParams;

    fn predict(&self, input: &Array1<f64>) -> f64;
    fn predict_batch(&self, input: &Array2<f64>) -> Array1<f64>;

    /// Number of input features expected.
    fn n_features(&self) -> usize;

    fn extract_params(&self) -> Self::ParamsRepr;
    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError>;

    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ModelError> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path)?;
        let params = Self::ParamsRepr::from_bytes(&bytes)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        Self::from_params(params)
    }
}
