//! Error types for cycler
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can be returned by the cycler library
#[derive(Debug, Error)]
pub enum CyclerError {
    /// Interval was zero, negative, NaN or too large to represent
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A cycle was spawned outside of a tokio runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// Clock speed factor was not a finite positive number
    #[error("Invalid clock speed: {0}")]
    InvalidSpeed(String),
}

/// Result type alias for cycler operations
pub type Result<T> = std::result::Result<T, CyclerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_interval_error() {
        let err = CyclerError::InvalidInterval("0ns".to_string());
        assert_eq!(err.to_string(), "Invalid interval: 0ns");
    }

    #[test]
    fn test_no_runtime_error() {
        let err = CyclerError::NoRuntime("spawn called from plain thread".to_string());
        assert_eq!(
            err.to_string(),
            "No tokio runtime available: spawn called from plain thread"
        );
    }

    #[test]
    fn test_invalid_speed_error() {
        let err = CyclerError::InvalidSpeed("-1".to_string());
        assert_eq!(err.to_string(), "Invalid clock speed: -1");
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(3)
        }

        fn returns_err() -> Result<u32> {
            Err(CyclerError::InvalidInterval("NaN".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
