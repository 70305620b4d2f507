//! Error types for the feature-engineering stage.

use thiserror::Error;

/// Error type for loading, cleaning, encoding, geocoding and scaling.
///
/// Row-level data-quality problems are normally handled by the row filter
/// (the row is dropped). Everything that reaches these variants is a hard
/// failure: encoding an unknown category or a missing geocode into a number
/// would silently corrupt the dataset.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Category string outside a closed vocabulary.
    #[error("Unknown category in {column}: '{value}'")]
    UnknownCategory { column: &'static str, value: String },
    /// Postal code absent from the geocode reference table.
    #[error("Unknown postal code: {0}")]
    UnknownPostalCode(u32),
    /// Region name absent from the region reference table.
    #[error("Unknown region: '{0}'")]
    UnknownRegion(String),
    /// Non-numeric or out-of-range value in a numeric column.
    #[error("Invalid numeric input in {column}: {reason}")]
    InvalidNumericInput { column: String, reason: String },
    /// A required column is not present in a tabular input.
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// A tabular input carries a column nobody asked for.
    #[error("Unexpected column: {0}")]
    UnexpectedColumn(String),
    /// Shape mismatch between expected and actual dimensions.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
    /// Invalid configuration or hyperparameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// Error attributed to a specific input row (0-based, header excluded).
    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<PreprocessingError>,
    },
    /// Malformed CSV or a value that does not parse into its column type.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PreprocessingError {
    /// Attach the index of the offending input row.
    pub fn at_row(self, row: usize) -> Self {
        PreprocessingError::Row {
            row,
            source: Box::new(self),
        }
    }

    pub(crate) fn invalid_number(column: impl Into<String>, reason: impl Into<String>) -> Self {
        PreprocessingError::InvalidNumericInput {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_category() {
        let err = PreprocessingError::UnknownCategory {
            column: "subtype_of_property",
            value: "igloo".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unknown category"));
        assert!(msg.contains("igloo"));
    }

    #[test]
    fn test_error_display_unknown_postal_code() {
        let err = PreprocessingError::UnknownPostalCode(9999);
        assert_eq!(err.to_string(), "Unknown postal code: 9999");
    }

    #[test]
    fn test_error_display_unknown_region() {
        let err = PreprocessingError::UnknownRegion("Atlantis".to_string());
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_error_display_invalid_numeric_input() {
        let err = PreprocessingError::invalid_number("price", "must be positive");
        assert!(err.to_string().contains("Invalid numeric input in price"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PreprocessingError::FeatureMismatch {
            expected_features: 12,
            got_features: 3,
        };
        assert!(err.to_string().contains("Feature mismatch"));
    }

    #[test]
    fn test_error_at_row_keeps_source() {
        let err = PreprocessingError::UnknownPostalCode(1234).at_row(7);
        assert_eq!(err.to_string(), "Row 7: Unknown postal code: 1234");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("1234"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PreprocessingError = io_err.into();
        assert!(matches!(err, PreprocessingError::IoError(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let bincode_result: Result<String, bincode::Error> = bincode::deserialize(bad_bytes);
        if let Err(e) = bincode_result {
            let err: PreprocessingError = e.into();
            assert!(matches!(err, PreprocessingError::SerializationError(_)));
        }
    }
}
