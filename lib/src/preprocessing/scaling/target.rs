//! Target transforms: `log1p` compression of prices and its `expm1` inverse.
//!
//! The price distribution has a long right tail; `log1p` compresses it so
//! large outliers do not dominate a squared-error loss. `log1p`/`expm1` are
//! used instead of `ln(1 + x)`/`exp(x) - 1` for precision near zero.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, StatelessTransformer, Transformer};
use ndarray::Array1;

/// Stateless `y -> ln(1 + y)` transform with `expm1` as its inverse.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log1pTransform;

impl Log1pTransform {
    fn validate(values: &Array1<f64>) -> Result<(), PreprocessingError> {
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(PreprocessingError::invalid_number(
                "price",
                format!("log1p needs a finite non-negative value, got {} at row {}", v, i),
            ));
        }
        Ok(())
    }
}

impl Transformer for Log1pTransform {
    type Input = Array1<f64>;
    type Output = Array1<f64>;
    type Params = ();
    type Fitted = Log1pTransform;

    fn fit(&self, _data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        Ok(*self)
    }
}

impl FittedTransformer for Log1pTransform {
    type Input = Array1<f64>;
    type Output = Array1<f64>;
    type Params = ();

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        Self::validate(data)?;
        Ok(data.mapv(f64::ln_1p))
    }

    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input, PreprocessingError> {
        Ok(data.mapv(f64::exp_m1))
    }

    fn extract_params(&self) -> Self::Params {}

    fn from_params(_params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(Log1pTransform)
    }

    fn n_features_in(&self) -> usize {
        1
    }
}

impl StatelessTransformer for Log1pTransform {
    fn transform_direct(data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        Log1pTransform.transform(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_log1p_round_trip() {
        let prices = array![1.0, 100_000.0, 249_999.5, 900_000.0, 3.5e6];
        let log = Log1pTransform::transform_direct(&prices).unwrap();
        let back = Log1pTransform.inverse_transform(&log).unwrap();
        for (p, b) in prices.iter().zip(back.iter()) {
            assert!((p - b).abs() <= 1e-9 * p.max(1.0), "{} vs {}", p, b);
        }
    }

    #[test]
    fn test_log1p_small_values_are_precise() {
        let tiny = array![1e-12];
        let log = Log1pTransform::transform_direct(&tiny).unwrap();
        assert!((log[0] - 1e-12).abs() < 1e-24);
        let back = Log1pTransform.inverse_transform(&log).unwrap();
        assert!((back[0] - 1e-12).abs() < 1e-24);
    }

    #[test]
    fn test_log1p_rejects_negative() {
        let bad = array![10.0, -5.0];
        assert!(matches!(
            Log1pTransform::transform_direct(&bad),
            Err(PreprocessingError::InvalidNumericInput { .. })
        ));
    }

    #[test]
    fn test_log1p_rejects_nan() {
        let bad = array![f64::NAN];
        assert!(Log1pTransform::transform_direct(&bad).is_err());
    }

    #[test]
    fn test_log1p_fit_is_identity() {
        let fitted = Log1pTransform.fit(&array![1.0]).unwrap();
        assert_eq!(fitted.transform(&array![0.0]).unwrap()[0], 0.0);
    }
}
