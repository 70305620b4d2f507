//! JSON configuration for both pipeline stages.
//!
//! Every field has a default, so `{}` is a complete configuration:
//!
//! ```json
//! {
//!   "filter": { "zero_plot": "drop" },
//!   "training": { "model": { "kind": "linear" }, "max_epochs": 20 }
//! }
//! ```

use crate::dataset::listing::DEFAULT_IGNORED_COLUMNS;
use crate::error::PipelineError;
use crate::geo::RegionReference;
use crate::model::FeedForwardConfig;
use crate::preprocessing::{CategoricalEncoder, FilterConfig, OnUnknown, SubtypeVocabulary};
use crate::trainer::EarlyStoppingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    /// Region name -> capital coordinates.
    #[serde(default)]
    pub regions: RegionReference,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.training.validate()?;
        if self.encoding.vocabulary.is_empty() {
            return Err(PipelineError::Config("subtype vocabulary is empty".to_string()));
        }
        if self.regions.is_empty() {
            return Err(PipelineError::Config("region table is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Columns accepted in the listing CSV and discarded.
    #[serde(default = "default_ignored_columns")]
    pub ignored_columns: Vec<String>,
}

fn default_ignored_columns() -> Vec<String> {
    DEFAULT_IGNORED_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            ignored_columns: default_ignored_columns(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    #[serde(default)]
    pub vocabulary: SubtypeVocabulary,
    #[serde(default)]
    pub on_unknown: OnUnknown,
}

impl EncodingConfig {
    pub fn encoder(&self) -> CategoricalEncoder {
        CategoricalEncoder::new(self.vocabulary.clone()).with_on_unknown(self.on_unknown)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    FeedForward(FeedForwardConfig),
    Linear,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::FeedForward(FeedForwardConfig::default())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

/// Where the early-stopping validation rows come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationSplit {
    /// No validation set; early stopping monitors the training loss.
    None,
    /// Hold out the trailing `fraction` of the training partition.
    TrainTail { fraction: f64 },
    /// Monitor the first `max_rows` rows of the test partition.
    TestHead { max_rows: usize },
}

impl Default for ValidationSplit {
    fn default() -> Self {
        ValidationSplit::TrainTail { fraction: 0.1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seeds the split, weight initialization, dropout and diagnostics.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub optimizer: OptimizerKind,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,
    #[serde(default)]
    pub validation: ValidationSplit,
    #[serde(default = "default_early_stopping")]
    pub early_stopping: Option<EarlyStoppingConfig>,
    #[serde(default)]
    pub verbose: bool,
    /// Compute permutation importance on the test partition.
    #[serde(default)]
    pub feature_importance: bool,
    #[serde(default = "default_importance_sample")]
    pub importance_sample: usize,
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_learning_rate() -> f64 {
    0.001
}

fn default_batch_size() -> usize {
    32
}

fn default_max_epochs() -> usize {
    100
}

fn default_early_stopping() -> Option<EarlyStoppingConfig> {
    Some(EarlyStoppingConfig::default())
}

fn default_importance_sample() -> usize {
    250
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            model: ModelConfig::default(),
            optimizer: OptimizerKind::default(),
            learning_rate: default_learning_rate(),
            batch_size: default_batch_size(),
            max_epochs: default_max_epochs(),
            validation: ValidationSplit::default(),
            early_stopping: default_early_stopping(),
            verbose: false,
            feature_importance: false,
            importance_sample: default_importance_sample(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fail = |msg: String| Err(PipelineError::Config(msg));
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return fail(format!("test_fraction must be in (0, 1), got {}", self.test_fraction));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return fail(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if self.batch_size == 0 {
            return fail("batch_size must be positive".to_string());
        }
        if let ValidationSplit::TrainTail { fraction } = self.validation {
            if !(0.0..1.0).contains(&fraction) {
                return fail(format!("validation fraction must be in [0, 1), got {}", fraction));
            }
        }
        if let ValidationSplit::TestHead { max_rows: 0 } = self.validation {
            return fail("test_head validation needs max_rows >= 1".to_string());
        }
        if self.feature_importance && self.importance_sample == 0 {
            return fail("importance_sample must be positive when feature_importance is on".to_string());
        }
        if let Some(es) = &self.early_stopping {
            if es.min_delta < 0.0 || es.patience == 0 {
                return fail("early stopping needs min_delta >= 0 and patience >= 1".to_string());
            }
        }
        if let ModelConfig::FeedForward(ff) = &self.model {
            ff.validate()?;
        }
        Ok(())
    }
}
