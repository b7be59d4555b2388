//! Error types and result utilities for signal and filter operations.

use thiserror::Error;

/// Convenience type alias for results that may contain SignalError
pub type SignalResult<T> = Result<T, SignalError>;

/// Error types that can occur while building, converting or filtering signals.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Error that occurs when an array does not have the layout an operation needs.
    ///
    /// This covers invalid reshape requests, unsupported coefficient ranks and
    /// empty sample arrays.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Error that occurs when array dimensions don't match expected values.
    ///
    /// This happens when the number of sampling times differs from the number of
    /// samples, or when a persisted filter state does not fit the signal.
    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),

    /// Error that occurs when invalid parameters are provided to an operation.
    ///
    /// This includes non-positive sampling rates, a filter state without
    /// coefficients and filters whose leading denominator coefficient is zero.
    #[error("Invalid parameter error: {0}")]
    InvalidParameter(String),

    /// Error that occurs when a filter without coefficients is asked to process data.
    #[error("Filter not initialized: {0}")]
    FilterNotInitialized(String),

    /// Error raised by the domain conversion between time and frequency data.
    #[error("Transform error: {0}")]
    Transform(String),

    /// Error forwarded from `ndarray` when an array can not be reshaped or viewed.
    #[error(transparent)]
    Array(#[from] ndarray::ShapeError),
}

impl SignalError {
    /// Create a shape error from anything printable.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Create a dimension mismatch error describing the expected and actual shapes.
    pub fn dimension_mismatch(what: &str, expected: &[usize], actual: &[usize]) -> Self {
        Self::DimensionMismatch(format!(
            "{what}: expected shape {expected:?}, got {actual:?}"
        ))
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &str, reason: impl AsRef<str>) -> Self {
        Self::InvalidParameter(format!("{name}: {}", reason.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SignalError::dimension_mismatch("times", &[3], &[2]);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch error: times: expected shape [3], got [2]"
        );

        let err = SignalError::invalid_parameter("sampling_rate", "must be > 0");
        assert_eq!(
            err.to_string(),
            "Invalid parameter error: sampling_rate: must be > 0"
        );
    }

    #[test]
    fn test_ndarray_errors_convert() {
        let shape_err = ndarray::Array1::<f64>::zeros(4)
            .into_shape_with_order((3, 2))
            .unwrap_err();
        let err: SignalError = shape_err.into();
        assert!(matches!(err, SignalError::Array(_)));
    }
}
