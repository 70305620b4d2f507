//! Mini-batch training loop with optional early stopping.

pub mod early_stopping;

pub use early_stopping::{EarlyStopping, EarlyStoppingConfig, Progress};

use crate::{
    dataset::Dataset,
    loss::Loss,
    model::{ModelError, ParamOps, TrainableModel},
    optimizer::Optimizer,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Dataset is empty")]
    EmptyDataset,
    #[error("Invalid training parameter: {0}")]
    InvalidParameter(String),
    #[error("Data error: {0}")]
    Data(String),
    #[error("Shape mismatch: {predictions} predictions for {targets} targets")]
    ShapeMismatch { predictions: usize, targets: usize },
    #[error("Training loss became non-finite at epoch {epoch}")]
    Diverged { epoch: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Losses recorded at the end of one epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochRecord>,
    /// Epoch whose weights the fitted model carries when they were restored.
    pub best_epoch: Option<usize>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.epochs.last()
    }

    pub fn train_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_loss).collect()
    }

    pub fn val_losses(&self) -> Vec<f64> {
        self.epochs.iter().filter_map(|e| e.val_loss).collect()
    }
}

/// Fitted model plus the loss curve that produced it.
#[derive(Debug)]
pub struct TrainingOutcome<M> {
    pub model: M,
    pub history: TrainingHistory,
}

/// Orchestrates the training loop for a [`TrainableModel`].
///
/// Once built via [`TrainerBuilder`], it is immutable and can be reused across
/// models: every call to [`Trainer::fit`] starts from a fresh clone of the
/// configured optimizer.
#[derive(Clone, Debug)]
pub struct Trainer<L, O> {
    pub(crate) batch_size: usize,
    pub(crate) max_epochs: usize,
    pub(crate) verbose: bool,
    pub(crate) early_stopping: Option<EarlyStoppingConfig>,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
}

/// Fluent builder for constructing a [`Trainer`].
///
/// Defaults:
/// - `batch_size`: 32
/// - `max_epochs`: 100
/// - `verbose`: false
/// - `early_stopping`: none
pub struct TrainerBuilder<L, O> {
    batch_size: usize,
    max_epochs: usize,
    verbose: bool,
    early_stopping: Option<EarlyStoppingConfig>,
    loss_fn: L,
    optimizer: O,
}

impl<L: Loss, O> TrainerBuilder<L, O> {
    pub fn new(loss_fn: L, optimizer: O) -> Self {
        Self {
            batch_size: 32,
            max_epochs: 100,
            verbose: false,
            early_stopping: None,
            loss_fn,
            optimizer,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    /// Log every epoch at `info` instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn early_stopping(mut self, config: EarlyStoppingConfig) -> Self {
        self.early_stopping = Some(config);
        self
    }

    pub fn build(self) -> Trainer<L, O> {
        Trainer {
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            verbose: self.verbose,
            early_stopping: self.early_stopping,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
        }
    }
}

impl<L: Loss, O> Trainer<L, O> {
    /// Equivalent to `TrainerBuilder::new(...)`.
    pub fn builder(loss_fn: L, optimizer: O) -> TrainerBuilder<L, O> {
        TrainerBuilder::new(loss_fn, optimizer)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_epochs(&self) -> usize {
        self.max_epochs
    }

    /// Trains `model` on `train` for up to `max_epochs`.
    ///
    /// Batches are taken in dataset order. The epoch loss is the mean of the
    /// batch losses weighted by batch size. With early stopping configured the
    /// monitored value is the validation loss, or the training loss when no
    /// validation set is given.
    ///
    /// # Errors
    /// - [`TrainingError::EmptyDataset`] if `train` has no rows or unknown length
    /// - [`TrainingError::InvalidParameter`] for a zero batch size
    /// - [`TrainingError::Diverged`] if the training loss becomes NaN or infinite
    pub fn fit<M, D>(
        &self,
        mut model: M,
        train: &D,
        validation: Option<&D>,
    ) -> Result<TrainingOutcome<M::Output>, TrainingError>
    where
        M: TrainableModel,
        D: Dataset,
        O: Optimizer<M::Params> + Clone,
    {
        let n_total = train.len().ok_or(TrainingError::EmptyDataset)?;
        if n_total == 0 {
            return Err(TrainingError::EmptyDataset);
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidParameter("batch_size must be positive".to_string()));
        }

        let mut optimizer = self.optimizer.clone();
        let mut stopper = self.early_stopping.clone().map(EarlyStopping::<M::Params>::new);
        let mut history = TrainingHistory::default();

        for epoch in 0..self.max_epochs {
            let mut total_loss = 0.0;
            for batch in train.batches(self.batch_size) {
                let (batch_x, batch_y) = batch.map_err(|e| TrainingError::Data(format!("{:?}", e)))?;
                let preds = model.forward(&batch_x);
                check_shape(&preds, &batch_y)?;
                total_loss += self.loss_fn.loss(&preds, &batch_y) * batch_y.len() as f64;
                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds);
                let new_params = optimizer.step(model.params(), &grads);
                model.update_params(new_params);
            }

            let train_loss = total_loss / n_total as f64;
            if !train_loss.is_finite() {
                return Err(TrainingError::Diverged { epoch });
            }
            let val_loss = validation
                .map(|v| self.evaluate(&model, v))
                .transpose()?;

            if self.verbose {
                info!(epoch, train_loss, val_loss = ?val_loss, "epoch finished");
            } else {
                debug!(epoch, train_loss, val_loss = ?val_loss, "epoch finished");
            }
            history.epochs.push(EpochRecord {
                epoch,
                train_loss,
                val_loss,
            });

            if let Some(stopper) = stopper.as_mut() {
                let monitored = val_loss.unwrap_or(train_loss);
                if stopper.observe(epoch, monitored, model.params()) == Progress::Stop {
                    info!(
                        epoch,
                        best_epoch = ?stopper.best_epoch(),
                        best_loss = stopper.best_loss(),
                        "early stopping"
                    );
                    history.stopped_early = true;
                    break;
                }
            }
        }

        if let Some(mut stopper) = stopper {
            if let Some(best) = stopper.take_best_params() {
                debug!(best_epoch = ?stopper.best_epoch(), "restoring best weights");
                model.update_params(best);
                history.best_epoch = stopper.best_epoch();
            }
        }

        Ok(TrainingOutcome {
            model: model.into_fitted(),
            history,
        })
    }

    /// Mean loss of the model in evaluation mode over `dataset`.
    pub fn evaluate<M, D>(&self, model: &M, dataset: &D) -> Result<f64, TrainingError>
    where
        M: TrainableModel,
        D: Dataset,
    {
        let n_total = dataset.len().ok_or(TrainingError::EmptyDataset)?;
        if n_total == 0 {
            return Err(TrainingError::EmptyDataset);
        }
        let mut total = 0.0;
        for batch in dataset.batches(self.batch_size.max(1)) {
            let (x, y) = batch.map_err(|e| TrainingError::Data(format!("{:?}", e)))?;
            let preds = model.predict_eval(&x);
            check_shape(&preds, &y)?;
            total += self.loss_fn.loss(&preds, &y) * y.len() as f64;
        }
        Ok(total / n_total as f64)
    }
}

fn check_shape(preds: &ndarray::Array1<f64>, targets: &ndarray::Array1<f64>) -> Result<(), TrainingError> {
    if preds.len() != targets.len() {
        return Err(TrainingError::ShapeMismatch {
            predictions: preds.len(),
            targets: targets.len(),
        });
    }
    Ok(())
}
