//! Shared fixtures for the immoprice benchmarks.
//!
//! Everything is generated from a seed so runs are comparable across
//! machines without shipping a dataset.

use immoprice::config::PipelineConfig;
use immoprice::dataset::split::train_test_split;
use immoprice::dataset::synthetic::{synthetic_geo_reference, synthetic_listings};
use immoprice::dataset::table::FeatureTable;
use immoprice::dataset::InMemoryDataset;
use immoprice::preprocessing::{FittedTransformer, Log1pTransform, ScalerState};
use immoprice::{FeaturePipeline, PipelineError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Actual prices and predictions off by up to ±15%.
pub fn noisy_prices(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let actual: Vec<f64> = (0..n).map(|_| rng.gen_range(80_000.0..900_000.0)).collect();
    let predicted = actual.iter().map(|p| p * rng.gen_range(0.85..1.15)).collect();
    (actual, predicted)
}

/// Feature table built from `n` synthetic listings with the default config.
pub fn feature_table(n: usize, seed: u64) -> Result<FeatureTable, PipelineError> {
    let config = PipelineConfig::default();
    let stage = FeaturePipeline::from_config(&config, synthetic_geo_reference()?).run(synthetic_listings(n, seed))?;
    Ok(stage.table)
}

/// Standardized training partition, ready for a trainer.
pub fn scaled_training_set(n: usize, seed: u64) -> Result<InMemoryDataset, PipelineError> {
    let table = feature_table(n, seed)?;
    let y_log = Log1pTransform.transform(&table.targets())?;
    let (train, _) = train_test_split(table.feature_matrix(), y_log, 0.2, seed)?;
    let scalers = ScalerState::fit(&train)?;
    Ok(scalers.scale(&train)?)
}
