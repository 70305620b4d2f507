//! Feature engineering for raw listings.
//!
//! Follows the same type-state pattern as the models: an unfitted
//! [`Transformer`] learns from data and returns a [`FittedTransformer`] that
//! can transform, invert and be saved.
//!
//! # Stages
//!
//! - [`filter`]: drop rows that cannot be encoded ([`RowFilter`])
//! - [`encoding`]: subtype vocabulary and ordinal scales ([`CategoricalEncoder`])
//! - [`features`]: encoding + geocoding + distance ([`FeatureAssembler`])
//! - [`scaling`]: `log1p` target transform and standardization ([`ScalerState`])
//!
//! # Example
//!
//! ```ignore
//! use immoprice::preprocessing::{FittedTransformer, StandardScaler, Transformer};
//!
//! let fitted = StandardScaler::new().fit(&train.features().to_owned())?;
//! let scaled_test = fitted.transform(&test_features)?;
//!
//! fitted.save_to_file("scaler.bin")?;
//! let loaded = FittedStandardScaler::load_from_file("scaler.bin")?;
//! ```

pub mod encoding;
pub mod error;
pub mod features;
pub mod filter;
pub mod scaling;
pub mod traits;

pub use encoding::{CategoricalEncoder, OnUnknown, SubtypeVocabulary};
pub use error::PreprocessingError;
pub use features::FeatureAssembler;
pub use filter::{DropReason, FilterConfig, FilterOutcome, FilterReport, RowFilter, ZeroPlotPolicy};
pub use scaling::{
    FittedStandardScaler, Log1pTransform, ScalerState, ScalerStateParams, StandardScaler,
    StandardScalerConfig, StandardScalerParams,
};
pub use traits::{FittedTransformer, StatelessTransformer, Transformer};
