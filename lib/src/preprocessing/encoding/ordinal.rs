//! Ordinal encoding for the three-level listing scales.

use crate::preprocessing::encoding::OnUnknown;
use crate::preprocessing::error::PreprocessingError;

/// Levels of `building_condition`, lowest first.
pub const BUILDING_CONDITION_LEVELS: [&str; 3] = ["to restore", "to renovate", "good"];

/// Levels of `equipped_kitchen`, lowest first.
pub const KITCHEN_LEVELS: [&str; 3] = ["not installed", "installed", "equipped"];

/// An ordered set of string levels bound to the column it encodes.
#[derive(Clone, Copy, Debug)]
pub struct OrdinalScale {
    column: &'static str,
    levels: &'static [&'static str],
}

impl OrdinalScale {
    pub const BUILDING_CONDITION: OrdinalScale = OrdinalScale {
        column: "building_condition",
        levels: &BUILDING_CONDITION_LEVELS,
    };

    pub const KITCHEN: OrdinalScale = OrdinalScale {
        column: "equipped_kitchen",
        levels: &KITCHEN_LEVELS,
    };

    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Code of the highest level.
    pub fn max_code(&self) -> u32 {
        self.levels.len() as u32 - 1
    }

    pub fn encode(&self, raw: &str, on_unknown: OnUnknown) -> Result<u32, PreprocessingError> {
        match self.levels.iter().position(|level| *level == raw) {
            Some(code) => Ok(code as u32),
            None => match on_unknown {
                OnUnknown::DefaultMax => Ok(self.max_code()),
                OnUnknown::Fail => Err(PreprocessingError::UnknownCategory {
                    column: self.column,
                    value: raw.to_string(),
                }),
            },
        }
    }
}

/// `"to restore"` -> 0, `"to renovate"` -> 1, anything else -> 2.
pub fn encode_building_condition(raw: &str) -> u32 {
    let scale = OrdinalScale::BUILDING_CONDITION;
    scale
        .encode(raw, OnUnknown::DefaultMax)
        .unwrap_or(scale.max_code())
}

pub fn encode_building_condition_with(
    raw: &str,
    on_unknown: OnUnknown,
) -> Result<u32, PreprocessingError> {
    OrdinalScale::BUILDING_CONDITION.encode(raw, on_unknown)
}

/// `"not installed"` -> 0, `"installed"` -> 1, anything else -> 2.
pub fn encode_kitchen(raw: &str) -> u32 {
    let scale = OrdinalScale::KITCHEN;
    scale
        .encode(raw, OnUnknown::DefaultMax)
        .unwrap_or(scale.max_code())
}

pub fn encode_kitchen_with(raw: &str, on_unknown: OnUnknown) -> Result<u32, PreprocessingError> {
    OrdinalScale::KITCHEN.encode(raw, on_unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_condition_codes() {
        assert_eq!(encode_building_condition("to restore"), 0);
        assert_eq!(encode_building_condition("to renovate"), 1);
        assert_eq!(encode_building_condition("good"), 2);
        assert_eq!(encode_building_condition("as new"), 2);
        assert_eq!(encode_building_condition("just renovated"), 2);
    }

    #[test]
    fn test_kitchen_codes() {
        assert_eq!(encode_kitchen("not installed"), 0);
        assert_eq!(encode_kitchen("installed"), 1);
        assert_eq!(encode_kitchen("equipped"), 2);
        assert_eq!(encode_kitchen("hyper equipped"), 2);
    }

    #[test]
    fn test_fail_policy() {
        assert_eq!(
            encode_building_condition_with("to renovate", OnUnknown::Fail).unwrap(),
            1
        );
        let err = encode_kitchen_with("usa hyper equipped", OnUnknown::Fail).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown category in equipped_kitchen: 'usa hyper equipped'"
        );
    }

    #[test]
    fn test_max_code() {
        assert_eq!(OrdinalScale::BUILDING_CONDITION.max_code(), 2);
        assert_eq!(OrdinalScale::KITCHEN.column(), "equipped_kitchen");
    }
}
