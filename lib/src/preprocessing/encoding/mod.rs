//! Categorical feature encoding for listing attributes.
//!
//! # Available Encoders
//!
//! ## Subtype vocabulary
//! Maps the 21 known property subtypes to fixed integer codes. A value outside
//! the vocabulary is an error, never a guess.
//!
//! ## Ordinal levels
//! Building condition and kitchen equipment are ordered three-level scales:
//!
//! ```text
//! "to restore"    -> 0     "not installed" -> 0
//! "to renovate"   -> 1     "installed"     -> 1
//! "good"          -> 2     "equipped"      -> 2
//! ```
//!
//! Strings outside a scale are resolved through [`OnUnknown`].

mod categorical;
mod ordinal;

pub use categorical::{encode_subtype, SubtypeVocabulary};
pub use ordinal::{
    encode_building_condition, encode_building_condition_with, encode_kitchen,
    encode_kitchen_with, OrdinalScale, BUILDING_CONDITION_LEVELS, KITCHEN_LEVELS,
};

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};

/// Strategy for strings outside an ordinal scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnUnknown {
    /// Map to the highest level of the scale.
    #[default]
    DefaultMax,
    /// Return [`PreprocessingError::UnknownCategory`].
    Fail,
}

/// Bundles the subtype vocabulary with the policy used for ordinal scales.
///
/// # Example
/// ```ignore
/// use immoprice::preprocessing::encoding::{CategoricalEncoder, OnUnknown};
///
/// let encoder = CategoricalEncoder::default().with_on_unknown(OnUnknown::Fail);
/// assert_eq!(encoder.subtype("villa")?, 17);
/// assert!(encoder.kitchen("semi equipped").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    pub vocabulary: SubtypeVocabulary,
    pub on_unknown: OnUnknown,
}

impl CategoricalEncoder {
    pub fn new(vocabulary: SubtypeVocabulary) -> Self {
        Self {
            vocabulary,
            on_unknown: OnUnknown::default(),
        }
    }

    pub fn with_on_unknown(mut self, on_unknown: OnUnknown) -> Self {
        self.on_unknown = on_unknown;
        self
    }

    pub fn subtype(&self, raw: &str) -> Result<u32, PreprocessingError> {
        encode_subtype(raw, &self.vocabulary)
    }

    pub fn building_condition(&self, raw: &str) -> Result<u32, PreprocessingError> {
        encode_building_condition_with(raw, self.on_unknown)
    }

    pub fn kitchen(&self, raw: &str) -> Result<u32, PreprocessingError> {
        encode_kitchen_with(raw, self.on_unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoder_uses_catch_all() {
        let encoder = CategoricalEncoder::default();
        assert_eq!(encoder.on_unknown, OnUnknown::DefaultMax);
        assert_eq!(encoder.building_condition("as new").unwrap(), 2);
        assert_eq!(encoder.kitchen("hyper equipped").unwrap(), 2);
        assert_eq!(encoder.subtype("house").unwrap(), 8);
    }

    #[test]
    fn test_strict_encoder_rejects_unknown_levels() {
        let encoder = CategoricalEncoder::default().with_on_unknown(OnUnknown::Fail);
        assert!(matches!(
            encoder.building_condition("as new"),
            Err(PreprocessingError::UnknownCategory {
                column: "building_condition",
                ..
            })
        ));
        assert_eq!(encoder.kitchen("installed").unwrap(), 1);
    }

    #[test]
    fn test_on_unknown_serde_names() {
        assert_eq!(
            serde_json::to_string(&OnUnknown::DefaultMax).unwrap(),
            "\"default_max\""
        );
        let parsed: OnUnknown = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(parsed, OnUnknown::Fail);
    }
}
