//! Test signal generation.
//!
//! ```rust
//! use acoustic_signals::utils::generation::impulse;
//!
//! let mut dirac = impulse(1000, 2000.0, &[1], 1.0, 0).unwrap();
//! assert_eq!(dirac.n_samples(), 1000);
//! assert_eq!(dirac.time().unwrap()[[0, 0]], 1.0);
//! ```

use ndarray::{Array1, ArrayD, Axis, IxDyn};

use crate::{Signal, SignalError, SignalResult, SignalType};

/// Generates a Dirac impulse of `amplitude` at sample `delay` in every channel.
///
/// The result is an energy signal of shape `cshape + [n_samples]`; an empty
/// `cshape` yields a single channel.
///
/// # Errors
/// Returns [`SignalError::InvalidParameter`] if `delay` is not inside the signal.
pub fn impulse(
    n_samples: usize,
    sampling_rate: f64,
    cshape: &[usize],
    amplitude: f64,
    delay: usize,
) -> SignalResult<Signal> {
    if delay >= n_samples {
        return Err(SignalError::invalid_parameter(
            "delay",
            format!("{delay} is outside of a signal with {n_samples} samples"),
        ));
    }
    let mut shape = cshape.to_vec();
    shape.push(n_samples);
    let mut data = ArrayD::<f64>::zeros(IxDyn(&shape));
    let sample_axis = Axis(shape.len() - 1);
    data.index_axis_mut(sample_axis, delay).fill(amplitude);
    Signal::new(data, sampling_rate, SignalType::Energy)
}

/// Generates a power signal holding a sine of `frequency` Hz.
pub fn sine(
    frequency: f64,
    n_samples: usize,
    sampling_rate: f64,
    amplitude: f64,
) -> SignalResult<Signal> {
    let omega = 2.0 * std::f64::consts::PI * frequency / sampling_rate;
    let data = Array1::from_iter((0..n_samples).map(|n| amplitude * (omega * n as f64).sin()));
    Signal::new(data, sampling_rate, SignalType::Power)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleData;

    #[test]
    fn test_impulse() {
        let mut signal = impulse(1000, 2000.0, &[1], 1.0, 0).unwrap();
        assert_eq!(signal.sampling_rate(), 2000.0);
        assert_eq!(signal.shape(), &[1]);
        assert_eq!(signal.signal_type(), SignalType::Energy);
        let time = signal.time().unwrap();
        assert_eq!(time[[0, 0]], 1.0);
        assert_eq!(time.sum(), 1.0);
    }

    #[test]
    fn test_impulse_multichannel_with_delay() {
        let mut signal = impulse(16, 100.0, &[2, 3], 0.5, 4).unwrap();
        assert_eq!(signal.cshape(), &[2, 3]);
        let time = signal.time().unwrap();
        assert_eq!(time[[1, 2, 4]], 0.5);
        assert_eq!(time.sum(), 3.0);
        assert!(impulse(16, 100.0, &[1], 1.0, 16).is_err());
    }

    #[test]
    fn test_scalar_cshape_becomes_one_channel() {
        let signal = impulse(8, 100.0, &[], 1.0, 0).unwrap();
        assert_eq!(signal.cshape(), &[1]);
    }

    #[test]
    fn test_sine() {
        let mut signal = sine(1000.0, 48, 48000.0, 1.0).unwrap();
        assert_eq!(signal.signal_type(), SignalType::Power);
        let spectrum = signal.freq().unwrap();
        assert!((spectrum[[0, 1]].norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
    }
}
