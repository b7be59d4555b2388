//! Spectral helpers working on [`Signal`]s.
//!
//! These are the analysis functions consumed by plotting front ends: phase,
//! group delay, zero padding and regularized inversion of a spectrum.
//!
//! ```rust
//! use acoustic_signals::operations::dsp::group_delay;
//! use acoustic_signals::utils::generation::impulse;
//!
//! let delayed = impulse(64, 48000.0, &[1], 1.0, 5).unwrap();
//! let delay = group_delay(&delayed).unwrap();
//! assert!((delay[[0, 10]] - 5.0).abs() < 1e-9);
//! ```

use std::f64::consts::{PI, TAU};

use ndarray::{Array1, ArrayD, ArrayViewD, ArrayViewMut1, Axis, IxDyn, Zip, s};
use num_complex::Complex64;
use tracing::debug;

use crate::operations::transforms::rfft;
use crate::operations::types::{InversionOptions, PadMode, PhaseUnwrap};
use crate::{Signal, SignalError, SignalResult, SignalType};

/// Phase of the spectrum in radians or degrees.
///
/// [`PhaseUnwrap::Unwrap`] makes the phase continuous along the frequency
/// axis by removing jumps larger than `π`; [`PhaseUnwrap::Wrap360`] wraps the
/// unwrapped phase to `[0, 2π]`.
pub fn phase(signal: &Signal, deg: bool, unwrap: PhaseUnwrap) -> SignalResult<ArrayD<f64>> {
    let spectrum = signal.freq_view()?;
    let mut phase = spectrum.mapv(|c| c.arg());
    if unwrap != PhaseUnwrap::None {
        let axis = Axis(phase.ndim() - 1);
        for lane in phase.lanes_mut(axis) {
            unwrap_lane(lane);
        }
    }
    if unwrap == PhaseUnwrap::Wrap360 {
        phase = wrap_to_2pi(phase.view());
    }
    if deg {
        phase.mapv_inplace(f64::to_degrees);
    }
    Ok(phase)
}

fn unwrap_lane(mut lane: ArrayViewMut1<'_, f64>) {
    let mut correction = 0.0;
    let mut previous = match lane.first() {
        Some(&first) => first,
        None => return,
    };
    for value in lane.iter_mut().skip(1) {
        let raw = *value;
        let step = raw - previous;
        let mut wrapped = (step + PI).rem_euclid(TAU) - PI;
        if wrapped == -PI && step > 0.0 {
            wrapped = PI;
        }
        if step.abs() >= PI {
            correction += wrapped - step;
        }
        previous = raw;
        *value = raw + correction;
    }
}

/// Wraps angles to `[0, 2π]`.
///
/// Strictly positive multiples of `2π` map to `2π` rather than `0`.
pub fn wrap_to_2pi(values: ArrayViewD<'_, f64>) -> ArrayD<f64> {
    values.mapv(|x| {
        let wrapped = x.rem_euclid(TAU);
        if wrapped == 0.0 && x > 0.0 { TAU } else { wrapped }
    })
}

/// Group delay in samples for every frequency bin.
///
/// Computed as `Re(FFT(n * x[n]) / FFT(x[n]))`; bins where the spectrum
/// vanishes are set to zero.
pub fn group_delay(signal: &Signal) -> SignalResult<ArrayD<f64>> {
    let time = signal.time_view()?;
    let axis = Axis(time.ndim() - 1);
    let ramp = Array1::from_iter((0..signal.n_samples()).map(|n| n as f64));
    let mut weighted = time.to_owned();
    for mut lane in weighted.lanes_mut(axis) {
        lane *= &ramp;
    }

    let spectrum = rfft(time.view(), SignalType::Energy)?;
    let weighted_spectrum = rfft(weighted.view(), SignalType::Energy)?;
    let mut delay = ArrayD::<f64>::zeros(spectrum.raw_dim());
    Zip::from(&mut delay)
        .and(&weighted_spectrum)
        .and(&spectrum)
        .for_each(|d, &num, &den| {
            if den.norm() > f64::EPSILON {
                *d = (num / den).re;
            }
        });
    Ok(delay)
}

/// Adds `pad_width` zeros to the time data.
///
/// [`PadMode::Center`] keeps the first `ceil(n_samples / 2)` samples in front
/// of the zeros and moves the rest behind them.
pub fn pad_zeros(signal: &Signal, pad_width: usize, mode: PadMode) -> SignalResult<Signal> {
    let time = signal.time_view()?;
    let n_samples = signal.n_samples();
    let mut shape = time.shape().to_vec();
    let last = shape.len() - 1;
    shape[last] = n_samples + pad_width;
    let mut padded = ArrayD::<f64>::zeros(IxDyn(&shape));
    debug!(pad_width, ?mode, n_samples, "padding signal with zeros");

    let axis = Axis(last);
    Zip::from(padded.lanes_mut(axis))
        .and(time.lanes(axis))
        .for_each(|mut out, input| match mode {
            PadMode::After => out.slice_mut(s![..n_samples]).assign(&input),
            PadMode::Before => out.slice_mut(s![pad_width..]).assign(&input),
            PadMode::Center => {
                let split = n_samples.div_ceil(2);
                out.slice_mut(s![..split]).assign(&input.slice(s![..split]));
                out.slice_mut(s![split + pad_width..])
                    .assign(&input.slice(s![split..]));
            }
        });

    Signal::new(padded, signal.sampling_rate(), signal.signal_type())
}

/// Inverts the spectrum with frequency dependent regularization.
///
/// Computes `conj(X) / (|X|^2 + ε)` where `ε` is `regu_inside` within
/// `freq_range` (in Hz), `regu_outside` elsewhere, or the per bin
/// `regu_final`, all scaled by `max |X|^2`.
///
/// # Errors
/// Returns [`SignalError::InvalidParameter`] if the frequency range is not
/// ascending and propagates option validation errors.
pub fn regularized_spectrum_inversion(
    signal: &Signal,
    freq_range: (f64, f64),
    options: &InversionOptions,
) -> SignalResult<Signal> {
    let (low, high) = freq_range;
    if low.is_nan() || high.is_nan() || low > high {
        return Err(SignalError::invalid_parameter(
            "freq_range",
            format!("lower limit {low} is above upper limit {high}"),
        ));
    }
    let n_bins = signal.n_bins();
    options.validate(n_bins)?;

    let regu = match &options.regu_final {
        Some(regu_final) => regu_final.clone(),
        None => {
            let idx_low = signal.find_nearest_frequency(low);
            let idx_high = signal.find_nearest_frequency(high);
            let mut regu = Array1::from_elem(n_bins, options.regu_outside);
            regu.slice_mut(s![idx_low..idx_high]).fill(options.regu_inside);
            regu
        }
    };

    let spectrum = signal.freq_view()?;
    let max_energy = spectrum
        .iter()
        .map(Complex64::norm_sqr)
        .fold(0.0, f64::max);
    debug!(max_energy, n_bins, "inverting spectrum");

    let axis = Axis(spectrum.ndim() - 1);
    let mut inverse = spectrum.to_owned();
    for mut lane in inverse.lanes_mut(axis) {
        for (value, &eps) in lane.iter_mut().zip(regu.iter()) {
            *value = value.conj() / (value.norm_sqr() + eps * max_energy);
        }
    }

    Signal::from_spectrum(
        inverse,
        signal.sampling_rate(),
        signal.n_samples(),
        signal.signal_type(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::SampleData;
    use crate::Domain;
    use crate::utils::generation::impulse;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn test_phase_of_delayed_impulse() {
        let signal = impulse(8, 8.0, &[1], 1.0, 1).unwrap();
        let wrapped = phase(&signal, false, PhaseUnwrap::None).unwrap();
        assert_eq!(wrapped.shape(), &[1, 5]);
        assert!(wrapped[[0, 0]].abs() < 1e-12);
        assert_approx_eq!(wrapped[[0, 1]], -PI / 4.0, 1e-9);
        assert_approx_eq!(wrapped[[0, 3]], -3.0 * PI / 4.0, 1e-9);

        let degrees = phase(&signal, true, PhaseUnwrap::None).unwrap();
        assert_approx_eq!(degrees[[0, 2]], -90.0, 1e-9);
    }

    #[test]
    fn test_phase_unwrap() {
        let signal = impulse(16, 16.0, &[1], 1.0, 3).unwrap();
        let unwrapped = phase(&signal, false, PhaseUnwrap::Unwrap).unwrap();
        for k in 1..=8 {
            let expected = -TAU * 3.0 * k as f64 / 16.0;
            assert_approx_eq!(unwrapped[[0, k]], expected, 1e-9);
        }
    }

    #[test]
    fn test_phase_unwrap_to_2pi() {
        let signal = impulse(16, 16.0, &[1], 1.0, 3).unwrap();
        let wrapped = phase(&signal, false, PhaseUnwrap::Wrap360).unwrap();
        assert!(wrapped[[0, 0]].abs() < 1e-12);
        assert_approx_eq!(wrapped[[0, 4]], PI / 2.0, 1e-9);
        assert_approx_eq!(wrapped[[0, 8]], PI, 1e-9);
        assert!(wrapped.iter().all(|&p| (0.0..=TAU).contains(&p)));

        let degrees = phase(&signal, true, PhaseUnwrap::Wrap360).unwrap();
        assert_approx_eq!(degrees[[0, 4]], 90.0, 1e-9);
    }

    #[test]
    fn test_wrap_to_2pi() {
        let values = array![-PI / 2.0, 0.0, TAU, 2.0 * TAU, 3.0 * PI].into_dyn();
        let wrapped = wrap_to_2pi(values.view());
        assert_approx_eq!(wrapped[0], 1.5 * PI, 1e-12);
        assert_eq!(wrapped[1], 0.0);
        assert_eq!(wrapped[2], TAU);
        assert_eq!(wrapped[3], TAU);
        assert_approx_eq!(wrapped[4], PI, 1e-12);
    }

    #[test]
    fn test_group_delay_of_delayed_impulse() {
        let signal = impulse(32, 100.0, &[2], 1.0, 3).unwrap();
        let delay = group_delay(&signal).unwrap();
        assert_eq!(delay.shape(), &[2, 17]);
        for value in delay.iter() {
            assert_approx_eq!(*value, 3.0, 1e-9);
        }
    }

    #[test]
    fn test_group_delay_of_silence_is_zero() {
        let silence = Signal::new(Array1::<f64>::zeros(8), 8.0, SignalType::Energy).unwrap();
        assert!(group_delay(&silence).unwrap().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_pad_zeros() {
        let signal = Signal::new(array![1.0, 2.0, 3.0, 4.0], 10.0, SignalType::Energy).unwrap();
        let mut after = pad_zeros(&signal, 2, PadMode::After).unwrap();
        assert_eq!(after.n_samples(), 6);
        assert_eq!(
            after.time().unwrap(),
            array![[1.0, 2.0, 3.0, 4.0, 0.0, 0.0]].into_dyn()
        );
        let mut before = pad_zeros(&signal, 2, PadMode::Before).unwrap();
        assert_eq!(
            before.time().unwrap(),
            array![[0.0, 0.0, 1.0, 2.0, 3.0, 4.0]].into_dyn()
        );
        let mut center = pad_zeros(&signal, 2, PadMode::Center).unwrap();
        assert_eq!(
            center.time().unwrap(),
            array![[1.0, 2.0, 0.0, 0.0, 3.0, 4.0]].into_dyn()
        );
        assert_eq!(signal.n_samples(), 4);
    }

    #[test]
    fn test_pad_zeros_keeps_channel_shape() {
        let signal = impulse(5, 10.0, &[2, 2], 1.0, 4).unwrap();
        let mut padded = pad_zeros(&signal, 3, PadMode::Center).unwrap();
        assert_eq!(padded.cshape(), &[2, 2]);
        let time = padded.time().unwrap();
        assert_eq!(time.shape(), &[2, 2, 8]);
        assert_eq!(time[[1, 1, 7]], 1.0);
    }

    #[test]
    fn test_regularized_spectrum_inversion() {
        let signal = impulse(16, 16.0, &[1], 2.0, 0).unwrap();
        let mut inverse =
            regularized_spectrum_inversion(&signal, (2.0, 6.0), &InversionOptions::default())
                .unwrap();
        assert_eq!(inverse.domain(), Domain::Frequency);
        let spectrum = inverse.freq().unwrap();
        // |X| = 2 everywhere, so max |X|^2 = 4.
        assert_approx_eq!(spectrum[[0, 0]].re, 2.0 / (4.0 + 4.0), 1e-12);
        assert_approx_eq!(spectrum[[0, 2]].re, 0.5, 1e-6);
        assert_approx_eq!(spectrum[[0, 5]].re, 0.5, 1e-6);
        assert_approx_eq!(spectrum[[0, 6]].re, 0.25, 1e-12);
    }

    #[test]
    fn test_regularized_inversion_with_final_regularization() {
        let signal = impulse(8, 8.0, &[1], 1.0, 0).unwrap();
        let options = InversionOptions::new().with_regu_final(array![0.0, 1.0, 0.0, 1.0, 0.0]);
        let mut inverse = regularized_spectrum_inversion(&signal, (0.0, 4.0), &options).unwrap();
        let spectrum = inverse.freq().unwrap();
        assert_approx_eq!(spectrum[[0, 0]].re, 1.0, 1e-12);
        assert_approx_eq!(spectrum[[0, 1]].re, 0.5, 1e-12);

        assert!(regularized_spectrum_inversion(&signal, (4.0, 1.0), &options).is_err());
        let wrong = InversionOptions::new().with_regu_final(array![1.0]);
        assert!(regularized_spectrum_inversion(&signal, (0.0, 4.0), &wrong).is_err());
    }
}
