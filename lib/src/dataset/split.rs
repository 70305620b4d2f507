//! Seeded train/test split with partitions tagged at the type level.
//!
//! Scalers accept only a [`Partition<Train>`], so fitting on test rows does
//! not compile.

use crate::preprocessing::error::PreprocessingError;
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::marker::PhantomData;

/// Marker for the training partition.
#[derive(Clone, Copy, Debug)]
pub struct Train;

/// Marker for the held-out test partition.
#[derive(Clone, Copy, Debug)]
pub struct Test;

/// Rows selected for one side of a split.
#[derive(Clone, Debug)]
pub struct Partition<S> {
    features: Array2<f64>,
    targets: Array1<f64>,
    indices: Vec<usize>,
    _state: PhantomData<S>,
}

impl<S> Partition<S> {
    fn select(features: &Array2<f64>, targets: &Array1<f64>, indices: Vec<usize>) -> Self {
        Self {
            features: features.select(Axis(0), &indices),
            targets: targets.select(Axis(0), &indices),
            indices,
            _state: PhantomData,
        }
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.targets
    }

    /// Positions of the selected rows in the unsplit input.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Shuffle row indices with `seed` and hold out `ceil(test_fraction * n)`
/// rows for testing.
///
/// # Errors
/// - `InvalidParameter` if `test_fraction` is not in `(0, 1)`.
/// - `InvalidShape` if features and targets disagree on the row count.
/// - `EmptyData` if either side would be empty.
pub fn train_test_split(
    features: Array2<f64>,
    targets: Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Partition<Train>, Partition<Test>), PreprocessingError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PreprocessingError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    let n = features.nrows();
    if targets.len() != n {
        return Err(PreprocessingError::InvalidShape {
            expected: format!("{} targets", n),
            got: format!("{} targets", targets.len()),
        });
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PreprocessingError::EmptyData(format!(
            "cannot split {} rows with test_fraction {}",
            n, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    let test_indices = indices;

    Ok((
        Partition::select(&features, &targets, train_indices),
        Partition::select(&features, &targets, test_indices),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| i as f64);
        (x, y)
    }

    #[test]
    fn test_split_sizes_use_ceiling() {
        let (x, y) = data(101);
        let (train, test) = train_test_split(x, y, 0.2, 42).unwrap();
        assert_eq!(test.len(), 21);
        assert_eq!(train.len(), 80);
    }

    #[test]
    fn test_split_is_a_partition() {
        let (x, y) = data(50);
        let (train, test) = train_test_split(x, y, 0.3, 1).unwrap();
        let mut all: Vec<usize> = train.indices().iter().chain(test.indices()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_rows_stay_aligned() {
        let (x, y) = data(20);
        let (train, _) = train_test_split(x, y, 0.25, 9).unwrap();
        for (row, &target) in train.features().rows().into_iter().zip(train.targets()) {
            assert_eq!(row[0], target * 3.0);
        }
    }

    #[test]
    fn test_split_is_reproducible() {
        let (x, y) = data(30);
        let (a, _) = train_test_split(x.clone(), y.clone(), 0.2, 7).unwrap();
        let (b, _) = train_test_split(x, y, 0.2, 7).unwrap();
        assert_eq!(a.indices(), b.indices());
    }

    #[test]
    fn test_invalid_fraction() {
        let (x, y) = data(10);
        assert!(matches!(
            train_test_split(x.clone(), y.clone(), 0.0, 0),
            Err(PreprocessingError::InvalidParameter(_))
        ));
        assert!(train_test_split(x, y, 1.0, 0).is_err());
    }

    #[test]
    fn test_too_few_rows() {
        let (x, y) = data(1);
        assert!(matches!(
            train_test_split(x, y, 0.5, 0),
            Err(PreprocessingError::EmptyData(_))
        ));
    }
}
