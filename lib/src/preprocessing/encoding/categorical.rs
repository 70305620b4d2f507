//! Closed vocabulary for `subtype_of_property`.

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_SUBTYPES: [&str; 21] = [
    "kot",
    "chalet",
    "flat studio",
    "service flat",
    "bungalow",
    "town house",
    "ground floor",
    "apartment",
    "house",
    "triplex",
    "farmhouse",
    "loft",
    "duplex",
    "apartment block",
    "country cottage",
    "penthouse",
    "mansion",
    "villa",
    "exceptional property",
    "manor house",
    "castle",
];

/// Subtype string -> integer code.
///
/// Serialized as a plain JSON object so it can be overridden from the
/// pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtypeVocabulary(BTreeMap<String, u32>);

impl SubtypeVocabulary {
    pub fn new(entries: BTreeMap<String, u32>) -> Self {
        Self(entries)
    }

    pub fn get(&self, subtype: &str) -> Option<u32> {
        self.0.get(subtype).copied()
    }

    pub fn contains(&self, subtype: &str) -> bool {
        self.0.contains_key(subtype)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SubtypeVocabulary {
    fn default() -> Self {
        Self(
            DEFAULT_SUBTYPES
                .iter()
                .enumerate()
                .map(|(code, name)| (name.to_string(), code as u32))
                .collect(),
        )
    }
}

/// Look up the code of a property subtype.
///
/// # Errors
/// [`PreprocessingError::UnknownCategory`] if `raw` is not in the vocabulary.
pub fn encode_subtype(raw: &str, vocabulary: &SubtypeVocabulary) -> Result<u32, PreprocessingError> {
    vocabulary
        .get(raw)
        .ok_or_else(|| PreprocessingError::UnknownCategory {
            column: "subtype_of_property",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_codes() {
        let vocab = SubtypeVocabulary::default();
        assert_eq!(vocab.len(), 21);
        assert_eq!(encode_subtype("kot", &vocab).unwrap(), 0);
        assert_eq!(encode_subtype("apartment", &vocab).unwrap(), 7);
        assert_eq!(encode_subtype("house", &vocab).unwrap(), 8);
        assert_eq!(encode_subtype("villa", &vocab).unwrap(), 17);
        assert_eq!(encode_subtype("castle", &vocab).unwrap(), 20);
    }

    #[test]
    fn test_unknown_subtype_is_error() {
        let vocab = SubtypeVocabulary::default();
        let err = encode_subtype("mixed use building", &vocab).unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::UnknownCategory {
                column: "subtype_of_property",
                ..
            }
        ));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let vocab = SubtypeVocabulary::default();
        assert!(encode_subtype("Villa", &vocab).is_err());
    }

    #[test]
    fn test_vocabulary_from_json() {
        let vocab: SubtypeVocabulary = serde_json::from_str(r#"{"igloo": 0, "yurt": 1}"#).unwrap();
        assert_eq!(vocab.get("yurt"), Some(1));
        assert!(!vocab.contains("house"));
    }
}
