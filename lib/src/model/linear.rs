//! Linear regression baseline with compile-time state tracking:
//! - [`LinearRegression`] = `LinearModel<Unfitted>`, used during training.
//! - `LinearModel<Fitted>`, an inference-only, serializable predictor.
//!
//! Selectable from the pipeline configuration as a cheap reference point for
//! the feed-forward network.

use crate::model::{Fitted, InferenceModel, ModelError, ParamOps, TrainableModel, Unfitted};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Trainable parameters of a linear model: weights and bias.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

/// Serializable representation of linear model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl From<&LinearParams> for SerializableLinearParams {
    fn from(params: &LinearParams) -> Self {
        Self {
            weights: params.weights.to_vec(),
            bias: params.bias,
        }
    }
}

impl TryFrom<SerializableLinearParams> for LinearParams {
    type Error = ModelError;

    fn try_from(value: SerializableLinearParams) -> Result<Self, Self::Error> {
        if value.weights.is_empty() {
            return Err(ModelError::InvalidParams("linear model has no weights".to_string()));
        }
        if !value.bias.is_finite() || value.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::InvalidParams("non-finite linear weight".to_string()));
        }
        Ok(Self {
            weights: Array1::from(value.weights),
            bias: value.bias,
        })
    }
}

impl ParamOps for LinearParams {
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            weights: self.weights.mapv(&f),
            bias: f(self.bias),
        }
    }

    fn zip_map<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self {
        let mut weights = self.weights.clone();
        weights.zip_mut_with(&other.weights, |a, &b| *a = f(*a, b));
        Self {
            weights,
            bias: f(self.bias, other.bias),
        }
    }
}

/// A linear model with state encoded at the type level.
#[derive(Clone, Debug)]
pub struct LinearModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

/// Alias for an unfitted linear regression model.
pub type LinearRegression = LinearModel<Unfitted>;

impl LinearRegression {
    /// Creates a new linear regression model with zero-initialized weights.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        })
    }

    /// Constructs a model from explicit parameters (e.g. for a warm start).
    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

impl LinearModel<Fitted> {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }
}

/// Forward pass: `X @ w + b`
/// Backward pass: `∇w = X^T · grad`, `∇b = sum(grad)`
impl TrainableModel for LinearModel<Unfitted> {
    type Params = LinearParams;
    type Output = LinearModel<Fitted>;

    fn forward(&mut self, x: &Array2<f64>) -> Array1<f64> {
        self.predict_eval(x)
    }

    fn predict_eval(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.params.weights) + self.params.bias
    }

    fn backward(&self, x: &Array2<f64>, grad_output: &Array1<f64>) -> LinearParams {
        LinearParams {
            weights: x.t().dot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &LinearParams {
        &self.params
    }

    fn update_params(&mut self, params: LinearParams) {
        self.params = params;
    }

    fn into_fitted(self) -> LinearModel<Fitted> {
        LinearModel::<Fitted>::new(self.params)
    }
}

impl InferenceModel for LinearModel<Fitted> {
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: &Array1<f64>) -> f64 {
        self.params.weights.dot(input) + self.params.bias
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Array1<f64> {
        input.dot(&self.params.weights) + self.params.bias
    }

    fn n_features(&self) -> usize {
        self.params.weights.len_of(Axis(0))
    }

    fn extract_params(&self) -> SerializableLinearParams {
        (&self.params).into()
    }

    fn from_params(params: SerializableLinearParams) -> Result<Self, ModelError> {
        Ok(Self::new(LinearParams::try_from(params)?))
    }
}
