//! The two pipeline stages as explicit values.
//!
//! ```text
//! Vec<ListingRecord> --FeaturePipeline--> FeatureTable + FilterReport
//! FeatureTable --TrainingPipeline--> PriceEstimator + EvaluationReport
//! ```

mod estimator;

pub use estimator::{FittedRegressor, PriceEstimator, PriceEstimatorParams, RegressorParams};

use crate::config::{ModelConfig, OptimizerKind, PipelineConfig, TrainingConfig, ValidationSplit};
use crate::dataset::listing::ListingRecord;
use crate::dataset::split::train_test_split;
use crate::dataset::table::{FeatureTable, FEATURE_NAMES};
use crate::dataset::InMemoryDataset;
use crate::diagnostics::{permutation_importance, FeatureImportance};
use crate::error::PipelineError;
use crate::geo::GeoReference;
use crate::loss::MSELoss;
use crate::metrics::{EvaluationReport, Metrics, RegressionMetrics};
use crate::model::{FeedForwardNetwork, LinearRegression, TrainableModel};
use crate::optimizer::{Adam, SGD};
use crate::preprocessing::{
    FeatureAssembler, FilterReport, FittedTransformer, Log1pTransform, PreprocessingError, RowFilter,
    ScalerState,
};
use crate::trainer::{Trainer, TrainingError, TrainingOutcome};
use ndarray::Array1;
use tracing::info;

/// Output of the feature-engineering stage.
#[derive(Clone, Debug)]
pub struct FeatureStageOutput {
    pub table: FeatureTable,
    pub report: FilterReport,
}

/// Stage (a): row filter followed by feature assembly.
#[derive(Clone, Debug)]
pub struct FeaturePipeline {
    filter: RowFilter,
    assembler: FeatureAssembler,
}

impl FeaturePipeline {
    pub fn new(filter: RowFilter, assembler: FeatureAssembler) -> Self {
        Self { filter, assembler }
    }

    pub fn from_config(config: &PipelineConfig, geo: GeoReference) -> Self {
        let filter = RowFilter::new(config.filter.clone(), config.encoding.vocabulary.clone());
        let assembler = FeatureAssembler::new(config.encoding.encoder(), geo, config.regions.clone());
        Self::new(filter, assembler)
    }

    pub fn run(&self, records: Vec<ListingRecord>) -> Result<FeatureStageOutput, PreprocessingError> {
        let outcome = self.filter.apply(records);
        let table = self.assembler.assemble(&outcome.records)?;
        Ok(FeatureStageOutput {
            table,
            report: outcome.report,
        })
    }
}

/// Output of the training stage.
#[derive(Clone, Debug)]
pub struct TrainingRun {
    pub estimator: PriceEstimator,
    pub report: EvaluationReport,
    /// Present when `feature_importance` is enabled.
    pub importance: Option<Vec<FeatureImportance>>,
}

/// Stage (b): log1p, split, scale, train, evaluate in currency units.
#[derive(Clone, Debug, Default)]
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn run(&self, table: &FeatureTable) -> Result<TrainingRun, PipelineError> {
        if table.is_empty() {
            return Err(PreprocessingError::EmptyData("feature table has no rows".to_string()).into());
        }
        let cfg = &self.config;

        let y_log = Log1pTransform.transform(&table.targets())?;
        let (train, test) = train_test_split(table.feature_matrix(), y_log, cfg.test_fraction, cfg.seed)?;
        info!(train = train.len(), test = test.len(), "split feature table");

        let scalers = ScalerState::fit(&train)?;
        let train_scaled = scalers.scale(&train)?;
        let test_scaled = scalers.scale(&test)?;

        let (fit_set, validation) = match cfg.validation {
            ValidationSplit::None => (train_scaled.clone(), None),
            ValidationSplit::TrainTail { fraction } => train_scaled.split_tail(fraction)?,
            ValidationSplit::TestHead { max_rows } => {
                (train_scaled.clone(), test_scaled.head(max_rows))
            }
        };

        let n_features = train_scaled.n_features();
        let (regressor, history) = match &cfg.model {
            ModelConfig::FeedForward(ff) => {
                let model = FeedForwardNetwork::new(n_features, ff, cfg.seed)?;
                let outcome = self.fit_model(model, &fit_set, validation.as_ref())?;
                (FittedRegressor::FeedForward(outcome.model), outcome.history)
            }
            ModelConfig::Linear => {
                let outcome = self.fit_model(LinearRegression::new(n_features), &fit_set, validation.as_ref())?;
                (FittedRegressor::Linear(outcome.model), outcome.history)
            }
        };
        info!(
            epochs = history.len(),
            best_epoch = ?history.best_epoch,
            stopped_early = history.stopped_early,
            "training finished"
        );

        let estimator = PriceEstimator::new(scalers, regressor);
        let train_metrics = evaluate(&estimator, &train_scaled, train.targets())?;
        let test_metrics = evaluate(&estimator, &test_scaled, test.targets())?;
        info!(%train_metrics, "train partition");
        info!(%test_metrics, "test partition");

        let importance = if cfg.feature_importance {
            let actual = Log1pTransform.inverse_transform(test.targets())?;
            let ranked = permutation_importance(
                |x| estimator.predict_prices(x),
                test.features(),
                &actual,
                &FEATURE_NAMES,
                cfg.importance_sample,
                cfg.seed,
            )?;
            Some(ranked)
        } else {
            None
        };

        Ok(TrainingRun {
            estimator,
            report: EvaluationReport {
                train: train_metrics,
                test: test_metrics,
                history,
            },
            importance,
        })
    }

    fn fit_model<M: TrainableModel>(
        &self,
        model: M,
        train: &InMemoryDataset,
        validation: Option<&InMemoryDataset>,
    ) -> Result<TrainingOutcome<M::Output>, TrainingError> {
        let lr = self.config.learning_rate;
        match self.config.optimizer {
            OptimizerKind::Adam => self.trainer(Adam::<M::Params>::new(lr)).fit(model, train, validation),
            OptimizerKind::Sgd => self.trainer(SGD::new(lr)).fit(model, train, validation),
        }
    }

    fn trainer<O>(&self, optimizer: O) -> Trainer<MSELoss, O> {
        let mut builder = Trainer::builder(MSELoss, optimizer)
            .batch_size(self.config.batch_size)
            .max_epochs(self.config.max_epochs)
            .verbose(self.config.verbose);
        if let Some(early_stopping) = &self.config.early_stopping {
            builder = builder.early_stopping(early_stopping.clone());
        }
        builder.build()
    }
}

/// Metrics in currency units for one scaled partition.
fn evaluate(
    estimator: &PriceEstimator,
    scaled: &InMemoryDataset,
    y_log: &Array1<f64>,
) -> Result<RegressionMetrics, PreprocessingError> {
    let z = estimator.regressor().predict_batch(scaled.features());
    let predicted = estimator.scalers().target_to_currency(&z)?;
    let actual = Log1pTransform.inverse_transform(y_log)?;
    Ok(Metrics::calculate_all(&actual.to_vec(), &predicted.to_vec()))
}
