use crate::model::ParamOps;

/// Trait for gradient-based optimizers.
///
/// Training logic (`Trainer`) is decoupled from parameter update logic, so any
/// model can be paired with any optimizer through [`ParamOps`].
///
/// # Example
/// ```rust
/// # use immoprice::optimizer::{Optimizer, SGD};
/// # use immoprice::model::LinearParams;
/// # use ndarray::array;
/// let params = LinearParams { weights: array![1.0, 2.0], bias: 0.5 };
/// let grads = LinearParams { weights: array![0.1, -0.2], bias: -0.01 };
/// let mut sgd = SGD::new(0.01);
/// let updated = sgd.step(&params, &grads);
/// assert!((updated.weights[0] - 0.999).abs() < 1e-12);
/// ```
pub trait Optimizer<P> {
    /// Returns updated parameters. Stateful optimizers advance their moment
    /// estimates on every call.
    fn step(&mut self, params: &P, gradients: &P) -> P;

    fn learning_rate(&self) -> f64;
}

/// Stochastic Gradient Descent: `θ ← θ - η · ∇L(θ)`.
#[derive(Clone, Debug)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }
}

impl<P: ParamOps> Optimizer<P> for SGD {
    fn step(&mut self, params: &P, grads: &P) -> P {
        let lr = self.lr;
        params.zip_map(grads, |p, g| p - lr * g)
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }
}

/// Adam with bias correction folded into the step size:
///
/// ```text
/// m ← β1·m + (1 - β1)·g
/// v ← β2·v + (1 - β2)·g²
/// η_t = η · sqrt(1 - β2^t) / (1 - β1^t)
/// θ ← θ - η_t · m / (sqrt(v) + ε)
/// ```
#[derive(Clone, Debug)]
pub struct Adam<P> {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
    m: Option<P>,
    v: Option<P>,
}

impl<P> Adam<P> {
    /// Adam with `β1 = 0.9`, `β2 = 0.999`, `ε = 1e-7`.
    pub fn new(lr: f64) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            m: None,
            v: None,
        }
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Drops the moment estimates.
    pub fn reset(&mut self) {
        self.t = 0;
        self.m = None;
        self.v = None;
    }
}

impl<P: ParamOps> Optimizer<P> for Adam<P> {
    fn step(&mut self, params: &P, grads: &P) -> P {
        let (b1, b2) = (self.beta1, self.beta2);
        let m = match &self.m {
            Some(m) => m.zip_map(grads, |m, g| b1 * m + (1.0 - b1) * g),
            None => grads.map(|g| (1.0 - b1) * g),
        };
        let v = match &self.v {
            Some(v) => v.zip_map(grads, |v, g| b2 * v + (1.0 - b2) * g * g),
            None => grads.map(|g| (1.0 - b2) * g * g),
        };
        self.t = self.t.saturating_add(1);

        let lr_t = self.lr * (1.0 - b2.powi(self.t)).sqrt() / (1.0 - b1.powi(self.t));
        let eps = self.epsilon;
        let update = m.zip_map(&v, |m, v| lr_t * m / (v.sqrt() + eps));
        let next = params.zip_map(&update, |p, u| p - u);

        self.m = Some(m);
        self.v = Some(v);
        next
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearParams;

    fn params(w: Vec<f64>, b: f64) -> LinearParams {
        LinearParams {
            weights: w.into(),
            bias: b,
        }
    }

    #[test]
    fn test_sgd_learning_rate_accessor() {
        let sgd = SGD::new(0.001);
        assert_eq!(Optimizer::<LinearParams>::learning_rate(&sgd), 0.001);
    }

    #[test]
    fn test_sgd_step_correctness() {
        let mut sgd = SGD::new(0.1);
        let updated = sgd.step(&params(vec![2.0, 3.0], 1.0), &params(vec![1.0, -1.0], 0.5));
        assert!((updated.weights[0] - 1.9).abs() < 1e-12);
        assert!((updated.weights[1] - 3.1).abs() < 1e-12);
        assert!((updated.bias - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_sgd_step_zero_gradients() {
        let mut sgd = SGD::new(0.1);
        let p = params(vec![1.0, 2.0], 0.5);
        let updated = sgd.step(&p, &params(vec![0.0, 0.0], 0.0));
        assert_eq!(updated, p);
    }

    #[test]
    fn test_sgd_step_does_not_mutate_inputs() {
        let mut sgd = SGD::new(0.1);
        let p = params(vec![1.0, 2.0], 0.5);
        let g = params(vec![0.5, 0.3], 0.1);
        let (p_copy, g_copy) = (p.clone(), g.clone());
        let _ = sgd.step(&p, &g);
        assert_eq!(p, p_copy);
        assert_eq!(g, g_copy);
    }

    #[test]
    fn test_adam_first_step_moves_by_learning_rate() {
        // With bias correction the first step is lr * sign(g) up to ε.
        let mut adam = Adam::new(0.01);
        let updated = adam.step(&params(vec![1.0, 1.0], 0.0), &params(vec![0.5, -2.0], 3.0));
        assert!((updated.weights[0] - 0.99).abs() < 1e-6);
        assert!((updated.weights[1] - 1.01).abs() < 1e-6);
        assert!((updated.bias + 0.01).abs() < 1e-6);
        assert_eq!(adam.steps(), 1);
    }

    #[test]
    fn test_adam_zero_gradient_keeps_params() {
        let mut adam = Adam::new(0.01);
        let p = params(vec![0.3], -0.2);
        let updated = adam.step(&p, &params(vec![0.0], 0.0));
        assert_eq!(updated, p);
    }

    #[test]
    fn test_adam_minimizes_quadratic() {
        // f(w) = (w - 3)^2, ∇f = 2(w - 3)
        let mut adam = Adam::new(0.1);
        let mut p = params(vec![0.0], 0.0);
        for _ in 0..500 {
            let g = LinearParams {
                weights: p.weights.mapv(|w| 2.0 * (w - 3.0)),
                bias: 0.0,
            };
            p = adam.step(&p, &g);
        }
        assert!((p.weights[0] - 3.0).abs() < 1e-2, "w = {}", p.weights[0]);
    }

    #[test]
    fn test_adam_reset() {
        let mut adam = Adam::new(0.01);
        let _ = adam.step(&params(vec![1.0], 0.0), &params(vec![1.0], 1.0));
        adam.reset();
        assert_eq!(adam.steps(), 0);
        let a = adam.step(&params(vec![1.0], 0.0), &params(vec![1.0], 1.0));
        assert!((a.weights[0] - 0.99).abs() < 1e-6);
    }
}
