//! Dataset abstractions and typed tabular I/O.
//!
//! # Core Concepts
//!
//! - **Dataset**: a source of `(X, y)` pairs where `X` is a feature matrix of
//!   shape `(n_samples, n_features)` and `y` a target vector of shape
//!   `(n_samples,)`.
//! - **Batch**: a contiguous subset of samples for mini-batch gradient descent.
//! - **Listing / feature tables**: the strongly typed CSV inputs and outputs of
//!   the feature-engineering stage ([`listing`], [`table`]).
//! - **Partitions**: train/test halves tagged at the type level ([`split`]).
//!
//! # Example
//!
//! ```rust
//! use immoprice::dataset::{Dataset, InMemoryDataset};
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0]];
//! let y = array![0.0, 1.0];
//! let dataset = InMemoryDataset::new(x, y).unwrap();
//!
//! for batch in dataset.batches(1) {
//!     let (x_batch, y_batch) = batch.unwrap();
//!     assert_eq!(x_batch.nrows(), y_batch.len());
//! }
//! ```

use ndarray::{Array1, Array2};
use std::{fmt::Debug, ops::Range};

pub mod listing;
pub mod memory;
pub mod split;
pub mod synthetic;
pub mod table;

pub use self::listing::{load_listings, write_listings, ListingRecord, PropertyType};
pub use self::memory::InMemoryDataset;
pub use self::split::{train_test_split, Partition, Test, Train};
pub use self::table::{FeatureTable, FeatureVector, FEATURE_NAMES, N_FEATURES};

/// Abstract interface for a machine learning dataset.
pub trait Dataset {
    /// Error type returned when accessing data.
    type Error: Debug + 'static;

    /// Returns the total number of samples in the dataset, if known.
    ///
    /// `None` means the size is unknown (streaming or lazily loaded sources).
    fn len(&self) -> Option<usize>;

    /// Checks whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Creates an iterator over fixed-size batches, in storage order.
    ///
    /// The last batch may be smaller than `batch_size`. A `batch_size` of
    /// zero yields nothing.
    fn batches(&self, batch_size: usize) -> DatasetBatchIter<'_, Self>
    where
        Self: Sized,
    {
        DatasetBatchIter {
            dataset: self,
            batch_size,
            current: 0,
        }
    }

    /// Loads the samples in `range` (`[start, end)`).
    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error>;
}

/// Iterator over dataset batches.
///
/// Created by [`Dataset::batches`]. Data is fetched only when `next()` is
/// called; errors from `get_batch` are forwarded as `Some(Err(e))`.
pub struct DatasetBatchIter<'a, D: ?Sized> {
    dataset: &'a D,
    batch_size: usize,
    current: usize,
}

impl<'a, D: Dataset> Iterator for DatasetBatchIter<'a, D> {
    type Item = Result<(Array2<f64>, Array1<f64>), D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.dataset.len()?;
        if self.batch_size == 0 || self.current >= total {
            return None;
        }

        let end = (self.current + self.batch_size).min(total);
        let range = self.current..end;
        self.current = end;

        Some(self.dataset.get_batch(range))
    }
}
