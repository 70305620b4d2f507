use serde::{Deserialize, Serialize};

/// Stop training once the monitored loss has not improved by at least
/// `min_delta` for `patience` consecutive epochs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EarlyStoppingConfig {
    #[serde(default = "default_min_delta")]
    pub min_delta: f64,
    #[serde(default = "default_patience")]
    pub patience: usize,
    #[serde(default = "default_restore_best_weights")]
    pub restore_best_weights: bool,
}

fn default_min_delta() -> f64 {
    0.02
}

fn default_patience() -> usize {
    15
}

fn default_restore_best_weights() -> bool {
    true
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self {
            min_delta: default_min_delta(),
            patience: default_patience(),
            restore_best_weights: default_restore_best_weights(),
        }
    }
}

/// Outcome of feeding one epoch's loss to [`EarlyStopping::observe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Improved,
    Stalled { wait: usize },
    Stop,
}

/// Tracks the best loss seen so far and a snapshot of the matching parameters.
#[derive(Clone, Debug)]
pub struct EarlyStopping<P> {
    config: EarlyStoppingConfig,
    best_loss: f64,
    best_epoch: Option<usize>,
    best_params: Option<P>,
    wait: usize,
}

impl<P: Clone> EarlyStopping<P> {
    pub fn new(config: EarlyStoppingConfig) -> Self {
        Self {
            config,
            best_loss: f64::INFINITY,
            best_epoch: None,
            best_params: None,
            wait: 0,
        }
    }

    pub fn observe(&mut self, epoch: usize, loss: f64, params: &P) -> Progress {
        // The first epoch always counts as an improvement.
        if self.best_epoch.is_none() || loss < self.best_loss - self.config.min_delta {
            self.best_loss = loss;
            self.best_epoch = Some(epoch);
            if self.config.restore_best_weights {
                self.best_params = Some(params.clone());
            }
            self.wait = 0;
            return Progress::Improved;
        }
        self.wait += 1;
        if self.wait >= self.config.patience {
            Progress::Stop
        } else {
            Progress::Stalled { wait: self.wait }
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    /// Snapshot to restore, if `restore_best_weights` is set.
    pub fn take_best_params(&mut self) -> Option<P> {
        self.best_params.take()
    }
}
