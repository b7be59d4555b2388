//! Conversion between the time and frequency domain.
//!
//! The transform itself is delegated to `rustfft`; this module only arranges
//! the data along the sample axis, keeps the one-sided half of the spectrum
//! and applies the normalization belonging to the [`SignalType`].
//!
//! | signal type | forward                              | inverse                 |
//! |-------------|--------------------------------------|-------------------------|
//! | energy      | unnormalized                         | `1/N`                   |
//! | power       | `1/N`, non-DC/non-Nyquist bins `·√2` | undoes the forward step |
//!
//! ```rust
//! use acoustic_signals::SignalType;
//! use acoustic_signals::operations::transforms::{irfft, rfft};
//! use ndarray::array;
//!
//! let x = array![[1.0, 0.0, 0.0, 0.0]].into_dyn();
//! let spectrum = rfft(x.view(), SignalType::Energy).unwrap();
//! assert_eq!(spectrum.shape(), &[1, 3]);
//!
//! let back = irfft(spectrum.view(), 4, SignalType::Energy).unwrap();
//! assert!((back[[0, 0]] - 1.0).abs() < 1e-12);
//! ```

use ndarray::{ArrayD, ArrayViewD, Axis, Zip};
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::trace;

use crate::{SignalError, SignalResult, SignalType};

/// Number of bins of the one-sided spectrum of `n_samples` real samples.
pub const fn n_bins(n_samples: usize) -> usize {
    n_samples / 2 + 1
}

/// Range of bins that carry energy of both the positive and negative frequencies.
///
/// DC is excluded and so is the Nyquist bin when `n_samples` is even.
fn mirrored_bins(n_samples: usize) -> std::ops::Range<usize> {
    let upper = if n_samples % 2 == 0 {
        n_bins(n_samples) - 1
    } else {
        n_bins(n_samples)
    };
    1..upper
}

/// One-sided FFT along the last axis of `data`.
///
/// # Errors
/// Returns [`SignalError::Shape`] for zero dimensional or empty input.
pub fn rfft(data: ArrayViewD<'_, f64>, signal_type: SignalType) -> SignalResult<ArrayD<Complex64>> {
    if data.ndim() == 0 || data.is_empty() {
        return Err(SignalError::shape("rfft needs at least one sample"));
    }
    let axis = Axis(data.ndim() - 1);
    let n_samples = data.len_of(axis);
    let bins = n_bins(n_samples);
    trace!(n_samples, bins, %signal_type, "forward transform");

    let mut shape = data.shape().to_vec();
    shape[axis.index()] = bins;
    let mut spectrum = ArrayD::<Complex64>::zeros(shape);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_samples);
    let mut buffer = vec![Complex64::new(0.0, 0.0); n_samples];

    Zip::from(spectrum.lanes_mut(axis))
        .and(data.lanes(axis))
        .for_each(|mut out, input| {
            for (slot, &x) in buffer.iter_mut().zip(input.iter()) {
                *slot = Complex64::new(x, 0.0);
            }
            fft.process(&mut buffer);
            for (o, &b) in out.iter_mut().zip(buffer.iter()) {
                *o = b;
            }
        });

    if signal_type == SignalType::Power {
        let scale = 1.0 / n_samples as f64;
        spectrum.mapv_inplace(|c| c * scale);
        let mirrored = mirrored_bins(n_samples);
        for mut lane in spectrum.lanes_mut(axis) {
            for k in mirrored.clone() {
                lane[k] *= std::f64::consts::SQRT_2;
            }
        }
    }

    Ok(spectrum)
}

/// Inverse of [`rfft`], producing `n_samples` real samples per channel.
///
/// # Errors
/// Returns [`SignalError::Transform`] if the number of bins does not belong
/// to `n_samples`.
pub fn irfft(
    spectrum: ArrayViewD<'_, Complex64>,
    n_samples: usize,
    signal_type: SignalType,
) -> SignalResult<ArrayD<f64>> {
    if spectrum.ndim() == 0 || n_samples == 0 {
        return Err(SignalError::shape("irfft needs at least one bin"));
    }
    let axis = Axis(spectrum.ndim() - 1);
    let bins = spectrum.len_of(axis);
    if bins != n_bins(n_samples) {
        return Err(SignalError::Transform(format!(
            "{bins} frequency bins do not match {n_samples} samples (expected {} bins)",
            n_bins(n_samples)
        )));
    }
    trace!(n_samples, bins, %signal_type, "inverse transform");

    let mut shape = spectrum.shape().to_vec();
    shape[axis.index()] = n_samples;
    let mut time = ArrayD::<f64>::zeros(shape);

    let mirrored = mirrored_bins(n_samples);
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n_samples);
    let mut buffer = vec![Complex64::new(0.0, 0.0); n_samples];
    let inv_n = 1.0 / n_samples as f64;

    Zip::from(time.lanes_mut(axis))
        .and(spectrum.lanes(axis))
        .for_each(|mut out, input| {
            for (k, slot) in buffer.iter_mut().take(bins).enumerate() {
                let mut value = input[k];
                if signal_type == SignalType::Power {
                    value *= n_samples as f64;
                    if mirrored.contains(&k) {
                        value /= std::f64::consts::SQRT_2;
                    }
                }
                *slot = value;
            }
            // Hermitian completion of the negative frequencies.
            for k in bins..n_samples {
                buffer[k] = buffer[n_samples - k].conj();
            }
            ifft.process(&mut buffer);
            for (o, b) in out.iter_mut().zip(buffer.iter()) {
                *o = b.re * inv_n;
            }
        });

    Ok(time)
}
