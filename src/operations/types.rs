//! Supporting types and enums for signal operations.
//!
//! This module contains the configuration types used by the filter bank and
//! the DSP helpers.

use std::fmt::{Display, Formatter};

use ndarray::Array1;

use crate::{SignalError, SignalResult};

/// Structure of the coefficients held by a [`crate::Filter`].
///
/// Every kind is stored as a rank 3 array `(n_filters, n_rows, n_coeffs)`;
/// the kind decides how the rows are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Finite impulse response. Row 0 is the numerator, row 1 a unit impulse
    /// denominator.
    Fir,
    /// Infinite impulse response with exactly two rows `[b, a]`.
    Iir,
    /// Cascade of second order sections, one `[b0, b1, b2, a0, a1, a2]` row each.
    Sos,
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fir => write!(f, "FIR"),
            Self::Iir => write!(f, "IIR"),
            Self::Sos => write!(f, "SOS"),
        }
    }
}

/// Where [`crate::operations::dsp::pad_zeros`] inserts the zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadMode {
    /// Append zeros after the last sample.
    #[default]
    After,
    /// Prepend zeros before the first sample.
    Before,
    /// Insert zeros in the middle of the signal.
    ///
    /// Useful for zero phase filters whose causal part sits at the start and
    /// whose acausal part sits at the end.
    Center,
}

/// Post processing of the phase returned by [`crate::operations::dsp::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseUnwrap {
    /// Wrapped phase in `[-π, π]`.
    #[default]
    None,
    /// Continuous phase along the frequency axis.
    Unwrap,
    /// Unwrapped, then wrapped to `[0, 2π]`.
    Wrap360,
}

/// Regularization used by
/// [`crate::operations::dsp::regularized_spectrum_inversion`].
///
/// The factors are relative to the maximum energy `max |X|^2` of the spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct InversionOptions {
    /// Regularization outside of the frequency range.
    pub regu_outside: f64,
    /// Regularization inside of the frequency range.
    pub regu_inside: f64,
    /// Per bin regularization replacing the inside/outside values.
    pub regu_final: Option<Array1<f64>>,
}

impl InversionOptions {
    /// Regularization of `1` outside and `-200 dB` inside the frequency range.
    pub fn new() -> Self {
        Self {
            regu_outside: 1.0,
            regu_inside: 10f64.powf(-200.0 / 20.0),
            regu_final: None,
        }
    }

    /// Sets the regularization outside of the frequency range.
    pub const fn with_regu_outside(mut self, regu_outside: f64) -> Self {
        self.regu_outside = regu_outside;
        self
    }

    /// Sets the regularization inside of the frequency range.
    pub const fn with_regu_inside(mut self, regu_inside: f64) -> Self {
        self.regu_inside = regu_inside;
        self
    }

    /// Sets a regularization value for every frequency bin.
    pub fn with_regu_final(mut self, regu_final: impl Into<Array1<f64>>) -> Self {
        self.regu_final = Some(regu_final.into());
        self
    }

    /// Validate the options against a spectrum with `n_bins` bins.
    pub fn validate(&self, n_bins: usize) -> SignalResult<()> {
        if self.regu_outside < 0.0 || self.regu_inside < 0.0 {
            return Err(SignalError::invalid_parameter(
                "regularization",
                "must not be negative",
            ));
        }
        if let Some(regu_final) = &self.regu_final {
            if regu_final.len() != n_bins {
                return Err(SignalError::dimension_mismatch(
                    "regu_final",
                    &[n_bins],
                    &[regu_final.len()],
                ));
            }
        }
        Ok(())
    }
}

impl Default for InversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn test_inversion_defaults() {
        let options = InversionOptions::default();
        assert_eq!(options.regu_outside, 1.0);
        assert_approx_eq!(options.regu_inside, 1e-10, 1e-6);
        assert!(options.regu_final.is_none());
        assert!(options.validate(5).is_ok());
    }

    #[test]
    fn test_inversion_validation() {
        let options = InversionOptions::new().with_regu_final(array![1.0, 1.0]);
        assert!(matches!(
            options.validate(3),
            Err(SignalError::DimensionMismatch(_))
        ));
        assert!(InversionOptions::new().with_regu_inside(-1.0).validate(3).is_err());
    }

    #[test]
    fn test_filter_kind_display() {
        assert_eq!(FilterKind::Sos.to_string(), "SOS");
        assert_eq!(PadMode::default(), PadMode::After);
    }
}
