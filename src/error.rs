//! Error types for the store-sales-forecast library.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for forecasting pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur anywhere in the feature, evaluation or forecast path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A series group contains the same date more than once.
    #[error("malformed series {key}: duplicate date {date}")]
    MalformedSeries { key: String, date: NaiveDate },

    /// A series group is not in ascending date order.
    #[error("unsorted input in series {key}: date order breaks at position {position}")]
    UnsortedInput { key: String, position: usize },

    /// A forecast row whose interval does not contain its point forecast.
    #[error("invalid forecast bounds on {date}: expected {lower} <= {yhat} <= {upper}")]
    InvalidBounds {
        date: NaiveDate,
        lower: f64,
        yhat: f64,
        upper: f64,
    },

    /// A model returned a row for a different date than requested.
    #[error("forecast date mismatch: expected {expected}, got {got}")]
    DateMismatch { expected: NaiveDate, got: NaiveDate },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Filesystem error at the ingestion or export boundary.
    #[error("io error: {0}")]
    Io(String),

    /// Malformed CSV input or a failed CSV write.
    #[error("csv error: {0}")]
    Csv(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2, got 1");

        let err = ForecastError::InvalidParameter("window must be positive".to_string());
        assert_eq!(err.to_string(), "invalid parameter: window must be positive");

        let date = NaiveDate::from_ymd_opt(2017, 3, 4).unwrap();
        let err = ForecastError::MalformedSeries {
            key: "1/GROCERY I".to_string(),
            date,
        };
        assert_eq!(
            err.to_string(),
            "malformed series 1/GROCERY I: duplicate date 2017-03-04"
        );

        let err = ForecastError::UnsortedInput {
            key: "1/BEVERAGES".to_string(),
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "unsorted input in series 1/BEVERAGES: date order breaks at position 3"
        );

        let err = ForecastError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::InsufficientData { needed: 2, got: 0 };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "train.csv");
        let err: ForecastError = io.into();
        assert!(matches!(err, ForecastError::Io(msg) if msg.contains("train.csv")));
    }
}
