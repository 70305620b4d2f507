//! Dense feed-forward regressor.
//!
//! ```text
//! x -> [Dense(units) -> ReLU -> Dropout(p)] x hidden_layers -> Dense(1)
//! ```
//!
//! Weights use Glorot-uniform initialization, biases start at zero. Dropout is
//! inverted (kept activations are scaled by `1 / (1 - p)` during training) so
//! inference needs no rescaling.

use crate::model::{Fitted, InferenceModel, ModelError, ParamOps, TrainableModel, Unfitted};
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HiddenLayer {
    pub units: usize,
    /// Dropout rate applied to this layer's activations while training.
    #[serde(default)]
    pub dropout: f64,
}

impl HiddenLayer {
    pub fn new(units: usize) -> Self {
        Self { units, dropout: 0.0 }
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }
}

/// Architecture of the network. The default is `128 -> 64 (dropout 0.1) -> 32`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardConfig {
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<HiddenLayer>,
}

fn default_hidden_layers() -> Vec<HiddenLayer> {
    vec![
        HiddenLayer::new(128),
        HiddenLayer::new(64).with_dropout(0.1),
        HiddenLayer::new(32),
    ]
}

impl Default for FeedForwardConfig {
    fn default() -> Self {
        Self {
            hidden_layers: default_hidden_layers(),
        }
    }
}

impl FeedForwardConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, layer) in self.hidden_layers.iter().enumerate() {
            if layer.units == 0 {
                return Err(ModelError::InvalidParams(format!("hidden layer {} has no units", i)));
            }
            if !(0.0..1.0).contains(&layer.dropout) {
                return Err(ModelError::InvalidParams(format!(
                    "hidden layer {} dropout must be in [0, 1), got {}",
                    i, layer.dropout
                )));
            }
        }
        Ok(())
    }
}

/// One fully connected layer: `out = input · weights + bias`.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseLayer {
    /// Shape `(n_in, n_out)`.
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl DenseLayer {
    fn glorot_uniform(n_in: usize, n_out: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (n_in + n_out) as f64).sqrt();
        Self {
            weights: Array2::from_shape_fn((n_in, n_out), |_| rng.gen_range(-limit..limit)),
            bias: Array1::zeros(n_out),
        }
    }

    fn apply(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.bias
    }
}

/// All layers, the output layer last.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedForwardParams {
    pub layers: Vec<DenseLayer>,
}

impl FeedForwardParams {
    pub fn n_features(&self) -> usize {
        self.layers.first().map_or(0, |l| l.weights.nrows())
    }
}

impl ParamOps for FeedForwardParams {
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .map(|l| DenseLayer {
                    weights: l.weights.mapv(&f),
                    bias: l.bias.mapv(&f),
                })
                .collect(),
        }
    }

    fn zip_map<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .zip(&other.layers)
                .map(|(a, b)| {
                    let mut weights = a.weights.clone();
                    weights.zip_mut_with(&b.weights, |x, &y| *x = f(*x, y));
                    let mut bias = a.bias.clone();
                    bias.zip_mut_with(&b.bias, |x, &y| *x = f(*x, y));
                    DenseLayer { weights, bias }
                })
                .collect(),
        }
    }
}

/// Serializable representation of the network parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableFeedForwardParams {
    pub layers: Vec<SerializableDenseLayer>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableDenseLayer {
    pub n_in: usize,
    pub n_out: usize,
    /// Row-major `(n_in, n_out)`.
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
}

impl From<&FeedForwardParams> for SerializableFeedForwardParams {
    fn from(params: &FeedForwardParams) -> Self {
        Self {
            layers: params
                .layers
                .iter()
                .map(|l| SerializableDenseLayer {
                    n_in: l.weights.nrows(),
                    n_out: l.weights.ncols(),
                    weights: l.weights.iter().copied().collect(),
                    bias: l.bias.to_vec(),
                })
                .collect(),
        }
    }
}

impl TryFrom<SerializableFeedForwardParams> for FeedForwardParams {
    type Error = ModelError;

    fn try_from(value: SerializableFeedForwardParams) -> Result<Self, Self::Error> {
        if value.layers.is_empty() {
            return Err(ModelError::InvalidParams("network has no layers".to_string()));
        }
        let mut layers = Vec::with_capacity(value.layers.len());
        let mut expected_in = None;
        for (i, layer) in value.layers.into_iter().enumerate() {
            if expected_in.is_some_and(|n| n != layer.n_in) {
                return Err(ModelError::InvalidParams(format!(
                    "layer {} expects {} inputs, previous layer produces {:?}",
                    i, layer.n_in, expected_in
                )));
            }
            if layer.bias.len() != layer.n_out {
                return Err(ModelError::InvalidParams(format!(
                    "layer {} has {} biases for {} units",
                    i,
                    layer.bias.len(),
                    layer.n_out
                )));
            }
            if layer.weights.iter().chain(&layer.bias).any(|v| !v.is_finite()) {
                return Err(ModelError::InvalidParams(format!("layer {} has non-finite values", i)));
            }
            let weights = Array2::from_shape_vec((layer.n_in, layer.n_out), layer.weights)
                .map_err(|e| ModelError::InvalidParams(format!("layer {}: {}", i, e)))?;
            expected_in = Some(layer.n_out);
            layers.push(DenseLayer {
                weights,
                bias: Array1::from(layer.bias),
            });
        }
        if expected_in != Some(1) {
            return Err(ModelError::InvalidParams(
                "output layer must have exactly one unit".to_string(),
            ));
        }
        Ok(Self { layers })
    }
}

/// Activations recorded by a training-mode forward pass.
#[derive(Clone, Debug)]
struct ForwardCache {
    /// Input to each layer (after ReLU and dropout of the previous one).
    inputs: Vec<Array2<f64>>,
    /// Pre-activation of each hidden layer.
    pre_activations: Vec<Array2<f64>>,
    /// Scaled keep-masks of the hidden layers that use dropout.
    masks: Vec<Option<Array2<f64>>>,
}

#[derive(Clone, Debug)]
struct TrainingState {
    dropout: Vec<f64>,
    rng: StdRng,
    cache: Option<ForwardCache>,
}

/// Feed-forward network with state encoded at the type level.
#[derive(Clone, Debug)]
pub struct FeedForwardModel<S> {
    params: FeedForwardParams,
    training: Option<TrainingState>,
    _state: PhantomData<S>,
}

/// Alias for an untrained network.
pub type FeedForwardNetwork = FeedForwardModel<Unfitted>;

impl FeedForwardModel<Unfitted> {
    /// Glorot-initialized network for `n_features` inputs.
    pub fn new(n_features: usize, config: &FeedForwardConfig, seed: u64) -> Result<Self, ModelError> {
        if n_features == 0 {
            return Err(ModelError::InvalidParams("network needs at least one input".to_string()));
        }
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(config.hidden_layers.len() + 1);
        let mut n_in = n_features;
        for hidden in &config.hidden_layers {
            layers.push(DenseLayer::glorot_uniform(n_in, hidden.units, &mut rng));
            n_in = hidden.units;
        }
        layers.push(DenseLayer::glorot_uniform(n_in, 1, &mut rng));

        Ok(Self {
            params: FeedForwardParams { layers },
            training: Some(TrainingState {
                dropout: config.hidden_layers.iter().map(|h| h.dropout).collect(),
                rng,
                cache: None,
            }),
            _state: PhantomData,
        })
    }

    fn forward_pass(
        params: &FeedForwardParams,
        input: &Array2<f64>,
        dropout: &[f64],
        mut rng: Option<&mut StdRng>,
    ) -> (Array1<f64>, ForwardCache) {
        let n_hidden = params.layers.len().saturating_sub(1);
        let mut cache = ForwardCache {
            inputs: Vec::with_capacity(params.layers.len()),
            pre_activations: Vec::with_capacity(n_hidden),
            masks: Vec::with_capacity(n_hidden),
        };

        let mut activation = input.clone();
        for (i, layer) in params.layers[..n_hidden].iter().enumerate() {
            let z = layer.apply(&activation);
            let mut h = z.mapv(relu);
            let rate = dropout.get(i).copied().unwrap_or(0.0);
            let mask = match rng.as_deref_mut() {
                Some(rng) if rate > 0.0 => {
                    let keep = 1.0 - rate;
                    let mask = Array2::from_shape_fn(h.dim(), |_| {
                        if rng.gen::<f64>() < keep {
                            1.0 / keep
                        } else {
                            0.0
                        }
                    });
                    h *= &mask;
                    Some(mask)
                }
                _ => None,
            };
            cache.inputs.push(activation);
            cache.pre_activations.push(z);
            cache.masks.push(mask);
            activation = h;
        }

        let output = match params.layers.last() {
            Some(layer) => layer.apply(&activation).index_axis_move(Axis(1), 0),
            None => Array1::zeros(input.nrows()),
        };
        cache.inputs.push(activation);
        (output, cache)
    }
}

impl TrainableModel for FeedForwardModel<Unfitted> {
    type Params = FeedForwardParams;
    type Output = FeedForwardModel<Fitted>;

    fn forward(&mut self, input: &Array2<f64>) -> Array1<f64> {
        match self.training.as_mut() {
            Some(state) => {
                let (output, cache) =
                    Self::forward_pass(&self.params, input, &state.dropout, Some(&mut state.rng));
                state.cache = Some(cache);
                output
            }
            None => self.predict_eval(input),
        }
    }

    fn predict_eval(&self, input: &Array2<f64>) -> Array1<f64> {
        Self::forward_pass(&self.params, input, &[], None).0
    }

    fn backward(&self, input: &Array2<f64>, grad_output: &Array1<f64>) -> FeedForwardParams {
        let cached = self
            .training
            .as_ref()
            .and_then(|s| s.cache.as_ref())
            .filter(|c| c.inputs.first().map_or(false, |x| x == input));
        let fresh;
        let cache = match cached {
            Some(cache) => cache,
            None => {
                fresh = Self::forward_pass(&self.params, input, &[], None).1;
                &fresh
            }
        };

        let n_layers = self.params.layers.len();
        let mut grads: Vec<DenseLayer> = Vec::with_capacity(n_layers);
        let mut delta = grad_output.clone().insert_axis(Axis(1));

        for l in (0..n_layers).rev() {
            if l < n_layers - 1 {
                if let Some(mask) = &cache.masks[l] {
                    delta *= mask;
                }
                delta.zip_mut_with(&cache.pre_activations[l], |d, &z| {
                    if z <= 0.0 {
                        *d = 0.0
                    }
                });
            }
            let layer_input = &cache.inputs[l];
            let grad_w = layer_input.t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            if l > 0 {
                delta = delta.dot(&self.params.layers[l].weights.t());
            }
            grads.push(DenseLayer {
                weights: grad_w,
                bias: grad_b,
            });
        }
        grads.reverse();
        FeedForwardParams { layers: grads }
    }

    fn params(&self) -> &FeedForwardParams {
        &self.params
    }

    fn update_params(&mut self, new_params: FeedForwardParams) {
        self.params = new_params;
        // Activations were computed with the old weights.
        if let Some(state) = self.training.as_mut() {
            state.cache = None;
        }
    }

    fn into_fitted(self) -> FeedForwardModel<Fitted> {
        FeedForwardModel::<Fitted>::new(self.params)
    }
}

impl FeedForwardModel<Fitted> {
    pub fn new(params: FeedForwardParams) -> Self {
        Self {
            params,
            training: None,
            _state: PhantomData,
        }
    }

    pub fn params(&self) -> &FeedForwardParams {
        &self.params
    }
}

impl InferenceModel for FeedForwardModel<Fitted> {
    type ParamsRepr = SerializableFeedForwardParams;

    fn predict(&self, input: &Array1<f64>) -> f64 {
        let batch = input.clone().insert_axis(Axis(0));
        self.predict_batch(&batch)[0]
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Array1<f64> {
        FeedForwardModel::<Unfitted>::forward_pass(&self.params, input, &[], None).0
    }

    fn n_features(&self) -> usize {
        self.params.n_features()
    }

    fn extract_params(&self) -> SerializableFeedForwardParams {
        (&self.params).into()
    }

    fn from_params(params: SerializableFeedForwardParams) -> Result<Self, ModelError> {
        Ok(Self::new(FeedForwardParams::try_from(params)?))
    }
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tiny_config() -> FeedForwardConfig {
        FeedForwardConfig {
            hidden_layers: vec![HiddenLayer::new(4), HiddenLayer::new(3)],
        }
    }

    fn loss_of(model: &FeedForwardModel<Unfitted>, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        let diff = model.predict_eval(x) - y;
        diff.dot(&diff) / y.len() as f64
    }

    #[test]
    fn test_default_architecture() {
        let model = FeedForwardNetwork::new(12, &FeedForwardConfig::default(), 0).unwrap();
        let shapes: Vec<(usize, usize)> = model.params().layers.iter().map(|l| l.weights.dim()).collect();
        assert_eq!(shapes, vec![(12, 128), (128, 64), (64, 32), (32, 1)]);
    }

    #[test]
    fn test_glorot_bounds_and_zero_bias() {
        let model = FeedForwardNetwork::new(12, &FeedForwardConfig::default(), 1).unwrap();
        let first = &model.params().layers[0];
        let limit = (6.0 / (12.0 + 128.0_f64)).sqrt();
        assert!(first.weights.iter().all(|w| w.abs() <= limit));
        assert!(first.bias.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_seeded_init_is_reproducible() {
        let a = FeedForwardNetwork::new(5, &tiny_config(), 42).unwrap();
        let b = FeedForwardNetwork::new(5, &tiny_config(), 42).unwrap();
        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn test_backward_matches_finite_difference() {
        let mut model = FeedForwardNetwork::new(3, &tiny_config(), 7).unwrap();
        let x = array![[0.5, -1.0, 2.0], [1.5, 0.3, -0.7], [-0.2, 0.8, 0.1]];
        let y = array![1.0, -0.5, 0.25];

        let pred = model.forward(&x);
        let grad_pred = (&pred - &y) * (2.0 / y.len() as f64);
        let grads = model.backward(&x, &grad_pred);

        let eps = 1e-6;
        for (l, i, j) in [(0, 0, 0), (0, 2, 3), (1, 1, 2), (2, 0, 0)] {
            let mut plus = model.params().clone();
            plus.layers[l].weights[[i, j]] += eps;
            let mut minus = model.params().clone();
            minus.layers[l].weights[[i, j]] -= eps;

            let mut shifted = model.clone();
            shifted.update_params(plus);
            let lp = loss_of(&shifted, &x, &y);
            shifted.update_params(minus);
            let lm = loss_of(&shifted, &x, &y);

            let numeric = (lp - lm) / (2.0 * eps);
            let analytic = grads.layers[l].weights[[i, j]];
            assert!((numeric - analytic).abs() < 1e-5, "layer {} ({},{}): {} vs {}", l, i, j, numeric, analytic);
        }
    }

    #[test]
    fn test_backward_ignores_cache_from_another_batch() {
        let mut model = FeedForwardNetwork::new(2, &tiny_config(), 13).unwrap();
        let a = array![[0.5, -1.0], [1.5, 0.3]];
        let b = array![[-0.4, 2.0], [0.9, -0.6]];
        let grad = array![0.3, -0.2];

        model.forward(&b);
        let expected = model.backward(&b, &grad);

        // Same row count, different rows: the cache from `a` must not be used.
        model.forward(&a);
        assert_eq!(model.backward(&b, &grad), expected);
    }

    #[test]
    fn test_update_params_clears_cached_activations() {
        let mut model = FeedForwardNetwork::new(2, &tiny_config(), 17).unwrap();
        let x = array![[0.5, -1.0], [1.5, 0.3]];
        let grad = array![0.3, -0.2];

        model.forward(&x);
        let mut moved = model.params().clone();
        moved.layers[0].weights.mapv_inplace(|w| w * 2.0);
        model.update_params(moved);

        let after_update = model.backward(&x, &grad);
        model.forward(&x);
        assert_eq!(model.backward(&x, &grad), after_update);
    }

    #[test]
    fn test_dropout_only_in_training() {
        let config = FeedForwardConfig {
            hidden_layers: vec![HiddenLayer::new(16).with_dropout(0.5)],
        };
        let mut model = FeedForwardNetwork::new(2, &config, 3).unwrap();
        let x = Array2::from_elem((8, 2), 1.0);

        let eval_a = model.predict_eval(&x);
        let eval_b = model.predict_eval(&x);
        assert_eq!(eval_a, eval_b);

        let train = model.forward(&x);
        assert_ne!(train, eval_a);
    }

    #[test]
    fn test_fitted_predict_matches_eval() {
        let model = FeedForwardNetwork::new(3, &tiny_config(), 11).unwrap();
        let x = array![[0.1, 0.2, 0.3], [1.0, -1.0, 0.5]];
        let expected = model.predict_eval(&x);
        let fitted = model.into_fitted();
        assert_eq!(fitted.predict_batch(&x), expected);
        assert_eq!(fitted.predict(&array![0.1, 0.2, 0.3]), expected[0]);
        assert_eq!(fitted.n_features(), 3);
    }

    #[test]
    fn test_save_load_reproduces_predictions() -> Result<(), Box<dyn std::error::Error>> {
        let fitted = FeedForwardNetwork::new(3, &tiny_config(), 5)?.into_fitted();
        let path = std::env::temp_dir().join("immoprice_test_mlp.bin");
        fitted.save_to_file(&path)?;
        let loaded = FeedForwardModel::<Fitted>::load_from_file(&path)?;
        std::fs::remove_file(&path).ok();

        let x = array![[0.3, -0.2, 1.1]];
        assert_eq!(loaded.predict_batch(&x), fitted.predict_batch(&x));
        Ok(())
    }

    #[test]
    fn test_from_params_rejects_broken_chain() {
        let params = SerializableFeedForwardParams {
            layers: vec![
                SerializableDenseLayer {
                    n_in: 2,
                    n_out: 3,
                    weights: vec![0.0; 6],
                    bias: vec![0.0; 3],
                },
                SerializableDenseLayer {
                    n_in: 4,
                    n_out: 1,
                    weights: vec![0.0; 4],
                    bias: vec![0.0],
                },
            ],
        };
        assert!(FeedForwardModel::<Fitted>::from_params(params).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let config = FeedForwardConfig {
            hidden_layers: vec![HiddenLayer::new(8).with_dropout(1.0)],
        };
        assert!(FeedForwardNetwork::new(4, &config, 0).is_err());
        assert!(FeedForwardNetwork::new(0, &FeedForwardConfig::default(), 0).is_err());
    }

    #[test]
    fn test_param_ops_zip_map() {
        let model = FeedForwardNetwork::new(2, &tiny_config(), 9).unwrap();
        let p = model.params();
        let doubled = p.add(p);
        assert_eq!(doubled, p.scale(2.0));
    }
}
