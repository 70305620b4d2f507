use crate::dataset::Dataset;
use crate::preprocessing::error::PreprocessingError;
use ndarray::{s, Array1, Array2};
use std::ops::Range;

/// Feature matrix and targets held fully in memory.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self, PreprocessingError> {
        if x.nrows() != y.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} targets", x.nrows()),
                got: format!("{} targets", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(PreprocessingError::EmptyData("Dataset is empty".to_string()));
        }
        Ok(Self { x, y })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.y
    }

    /// Hold out the trailing `fraction` of samples.
    ///
    /// Returns the leading part and, when both parts would be non-empty, the
    /// trailing part.
    pub fn split_tail(&self, fraction: f64) -> Result<(Self, Option<Self>), PreprocessingError> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "validation fraction must be in [0, 1), got {}",
                fraction
            )));
        }
        let n = self.n_samples();
        let split_at = (n as f64 * (1.0 - fraction)).floor() as usize;
        if split_at == 0 || split_at >= n {
            return Ok((self.clone(), None));
        }
        let head = Self {
            x: self.x.slice(s![..split_at, ..]).to_owned(),
            y: self.y.slice(s![..split_at]).to_owned(),
        };
        let tail = Self {
            x: self.x.slice(s![split_at.., ..]).to_owned(),
            y: self.y.slice(s![split_at..]).to_owned(),
        };
        Ok((head, Some(tail)))
    }

    /// The first `max_rows` samples (or all of them), `None` when that
    /// would leave no rows.
    pub fn head(&self, max_rows: usize) -> Option<Self> {
        let n = max_rows.min(self.n_samples());
        if n == 0 {
            return None;
        }
        Some(Self {
            x: self.x.slice(s![..n, ..]).to_owned(),
            y: self.y.slice(s![..n]).to_owned(),
        })
    }
}

impl Dataset for InMemoryDataset {
    type Error = PreprocessingError;

    fn len(&self) -> Option<usize> {
        Some(self.x.nrows())
    }

    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error> {
        if range.start > range.end || range.end > self.n_samples() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("range within 0..{}", self.n_samples()),
                got: format!("{}..{}", range.start, range.end),
            });
        }
        let x = self.x.slice(s![range.clone(), ..]).to_owned();
        let y = self.y.slice(s![range]).to_owned();
        Ok((x, y))
    }
}
