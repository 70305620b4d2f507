//! # immoprice
//!
//! Residential price estimation from structured listing attributes, in two
//! stages with a strict separation between fitting and inference.
//!
//! ## Stages
//!
//! - **Feature engineering**: drop rows that cannot be encoded, encode the
//!   categorical columns against closed vocabularies, geocode the postal code
//!   and measure the Haversine distance to the regional capital.
//! - **Regression**: `log1p` the price, split, standardize on the training
//!   partition only, train a small dense network with early stopping, then
//!   report MAE, RMSE, R², MAPE and sMAPE in currency units.
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: models carry their training state in the type
//!   system (`Unfitted` vs `Fitted`) and data partitions carry theirs
//!   (`Partition<Train>` vs `Partition<Test>`), so fitting a scaler on test
//!   rows does not compile.
//! - **Training/Inference Separation**: fitted models and scalers contain only
//!   prediction parameters; losses, optimizers and the trainer live apart.
//! - **Explicit stages**: every stage returns a new value instead of mutating a
//!   shared table.
//!
//! ## Quick Start
//!
//! ```rust
//! use immoprice::config::{PipelineConfig, TrainingConfig};
//! use immoprice::dataset::synthetic::{synthetic_geo_reference, synthetic_listings};
//! use immoprice::pipeline::{FeaturePipeline, TrainingPipeline};
//!
//! # fn main() -> Result<(), immoprice::PipelineError> {
//! let config = PipelineConfig::default();
//! let features = FeaturePipeline::from_config(&config, synthetic_geo_reference()?)
//!     .run(synthetic_listings(60, 7))?;
//!
//! let training = TrainingConfig { max_epochs: 5, ..config.training };
//! let run = TrainingPipeline::new(training)?.run(&features.table)?;
//! assert!(run.report.test.smape <= 200.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: typed listing/feature CSVs, batching, the train/test split
//! - `preprocessing`: row filter, encoders, feature assembly, scaling
//! - `geo`: postal-code reference, region capitals, Haversine distance
//! - `model`: linear baseline and feed-forward network
//! - `loss`, `optimizer`, `trainer`: the training loop
//! - `metrics`, `diagnostics`: evaluation in currency units
//! - `config`, `pipeline`: JSON configuration and stage orchestration

/// Configuration of both pipeline stages.
pub mod config;

/// Data loading utilities and dataset abstractions.
pub mod dataset;

/// Permutation feature importance.
pub mod diagnostics;

/// Top-level pipeline error.
pub mod error;

/// Geocoding and distance features.
pub mod geo;

/// Differentiable loss functions for model training.
pub mod loss;

/// Regression metrics and evaluation reports.
pub mod metrics;

/// Machine learning models with compile-time state safety.
pub mod model;

/// Optimization algorithms for parameter updates.
pub mod optimizer;

/// Feature-engineering and training stages.
pub mod pipeline;

/// Data preprocessing transformers.
pub mod preprocessing;

/// Model persistence.
pub mod serialization;

/// High-level training loop orchestration.
pub mod trainer;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use metrics::{EvaluationReport, Metrics, RegressionMetrics};
pub use pipeline::{FeaturePipeline, PriceEstimator, TrainingPipeline};
