//! End-to-end price estimation on synthetic listings.
//!
//! - Writes a listing CSV and a headerless postal-code CSV to the temp dir
//! - Loads both back with schema validation
//! - Runs the row filter and feature assembly, writes the feature CSV
//! - Trains the network, prints train/test metrics and the loss curve
//! - Saves the estimator, reloads it and prices a few listings
//!
//! Run with: cargo run --example price_pipeline [-- config.json]
//!
//! Set `RUST_LOG=immoprice=debug` to see per-epoch losses and dropped rows.

use immoprice::{
    config::PipelineConfig,
    dataset::{
        listing::{load_listings_from_path, write_listings},
        synthetic::{synthetic_listings, synthetic_postal_records, write_postal_codes},
        FEATURE_NAMES,
    },
    geo::GeoReference,
    pipeline::{FeaturePipeline, PriceEstimator, TrainingPipeline},
};
use std::error::Error;
use std::fs::File;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Residential Price Estimation ===\n");

    let mut config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    config.training.feature_importance = true;

    // 1. Synthetic inputs on disk
    let dir = std::env::temp_dir().join("immoprice_demo");
    std::fs::create_dir_all(&dir)?;
    let listings_path = dir.join("listings.csv");
    let postal_path = dir.join("postal_codes.csv");
    let features_path = dir.join("features.csv");
    let model_path = dir.join("estimator.bin");

    write_listings(&synthetic_listings(1_000, 42), File::create(&listings_path)?)?;
    write_postal_codes(&synthetic_postal_records(), File::create(&postal_path)?)?;
    println!("Wrote inputs to {}", dir.display());

    // 2. Load with validation
    let records = load_listings_from_path(&listings_path, &config.dataset.ignored_columns)?;
    let geo = GeoReference::from_csv_path(&postal_path)?;
    println!("Loaded {} listings and {} postal codes", records.len(), geo.len());

    // 3. Feature engineering
    let stage = FeaturePipeline::from_config(&config, geo).run(records)?;
    println!(
        "Row filter kept {} of {} rows",
        stage.report.kept_rows, stage.report.input_rows
    );
    for (reason, count) in &stage.report.dropped {
        println!("  dropped {:>4}: {}", count, reason);
    }
    stage.table.write_csv_path(&features_path)?;
    println!("Feature table: {} x {} -> {}\n", stage.table.len(), FEATURE_NAMES.len(), features_path.display());

    // 4. Training and evaluation
    let run = TrainingPipeline::new(config.training.clone())?.run(&stage.table)?;
    println!("{}\n", run.report);

    println!("Loss curve (every 5th epoch):");
    for record in run.report.history.epochs.iter().step_by(5) {
        match record.val_loss {
            Some(val) => println!("  epoch {:>3}: train {:.4}, val {:.4}", record.epoch, record.train_loss, val),
            None => println!("  epoch {:>3}: train {:.4}", record.epoch, record.train_loss),
        }
    }

    if let Some(importance) = &run.importance {
        println!("\nPermutation importance (MAE increase):");
        for item in importance.iter().take(5) {
            println!("  {:<18} {:>12.0}", item.feature, item.mae_increase);
        }
    }

    // 5. Persistence round trip
    run.estimator.save_to_file(&model_path)?;
    let loaded = PriceEstimator::load_from_file(&model_path)?;
    println!("\nSaved and reloaded estimator from {}", model_path.display());

    let sample = stage.table.feature_matrix().slice(ndarray::s![..5, ..]).to_owned();
    let prices = loaded.predict_prices(&sample)?;
    for (predicted, actual) in prices.iter().zip(stage.table.prices()) {
        println!("  predicted {:>10.0}  actual {:>10.0}", predicted, actual);
    }

    Ok(())
}
