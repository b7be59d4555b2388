//! Level conversions used when displaying signals.
//!
//! The plotting side of the library only reads `time`, `freq` and the
//! sampling rate of a [`crate::Signal`] and converts them to decibels with a
//! `log_prefix` (20 for field quantities, 10 for power quantities) and a
//! `log_reference`.
//!
//! # Examples
//!
//! ```rust
//! use acoustic_signals::utils::audio_math::{amplitude_to_db, db_to_amplitude};
//!
//! let db = amplitude_to_db(0.5_f64, 20.0, 1.0); // ≈ -6.02 dB
//! let amp = db_to_amplitude(db, 20.0, 1.0);
//! assert!((amp - 0.5).abs() < 1e-12);
//! ```

use ndarray::{ArrayD, ArrayViewD};
use num_traits::Float;

/// Default prefix for field quantities such as sound pressure.
pub const DEFAULT_LOG_PREFIX: f64 = 20.0;

/// Default reference value.
pub const DEFAULT_LOG_REFERENCE: f64 = 1.0;

/// Converts a linear value to decibels: `log_prefix * log10(|value| / log_reference)`.
///
/// The magnitude is floored at the smallest positive normal number so that
/// silence maps to a large negative but finite level.
pub fn amplitude_to_db<F: Float>(value: F, log_prefix: F, log_reference: F) -> F {
    let ratio = (value.abs() / log_reference).max(F::min_positive_value());
    log_prefix * ratio.log10()
}

/// Converts decibels back to a linear value, the inverse of [`amplitude_to_db`].
pub fn db_to_amplitude<F: Float>(db: F, log_prefix: F, log_reference: F) -> F {
    let ten = <F as num_traits::NumCast>::from(10.0).unwrap_or_else(F::one);
    log_reference * ten.powf(db / log_prefix)
}

/// Element-wise [`amplitude_to_db`] on an array.
pub fn to_db(values: ArrayViewD<'_, f64>, log_prefix: f64, log_reference: f64) -> ArrayD<f64> {
    values.mapv(|v| amplitude_to_db(v, log_prefix, log_reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn test_amplitude_to_db() {
        assert_approx_eq!(amplitude_to_db(10.0, 20.0, 1.0), 20.0, 1e-12);
        assert_approx_eq!(amplitude_to_db(-10.0, 20.0, 1.0), 20.0, 1e-12);
        assert_approx_eq!(amplitude_to_db(100.0, 10.0, 1.0), 20.0, 1e-12);
        assert_approx_eq!(amplitude_to_db(2.0, 20.0, 2e-5), 100.0, 1e-9);
        assert!(amplitude_to_db(0.0f64, 20.0, 1.0).is_finite());
        assert!(amplitude_to_db(0.0f32, 20.0, 1.0) < -700.0);
    }

    #[test]
    fn test_db_to_amplitude() {
        assert_approx_eq!(db_to_amplitude(-20.0, 20.0, 1.0), 0.1, 1e-12);
        assert_approx_eq!(db_to_amplitude(94.0, 20.0, 2e-5), 1.0023744672545447, 1e-9);
    }

    #[test]
    fn test_to_db_array() {
        let levels = to_db(
            array![[1.0, 0.1], [10.0, 0.01]].into_dyn().view(),
            DEFAULT_LOG_PREFIX,
            DEFAULT_LOG_REFERENCE,
        );
        assert_eq!(levels.shape(), &[2, 2]);
        assert_approx_eq!(levels[[1, 1]], -40.0, 1e-12);
        assert_approx_eq!(levels[[1, 0]], 20.0, 1e-12);
    }
}
