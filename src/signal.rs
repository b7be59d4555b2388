//! Unified time/frequency signal with lazy, cached domain conversion.
//!
//! A [`Signal`] is sampled uniformly at `sampling_rate` and can be read in
//! both domains. One representation is authoritative (selected by
//! [`Signal::domain`]); the other is derived on demand with
//! [`crate::operations::transforms`] and kept in a two-slot [`DomainCache`]
//! until data of the other domain is written.
//!
//! ```rust
//! use acoustic_signals::{Domain, Signal, SignalType};
//! use ndarray::array;
//!
//! let mut signal = Signal::new(array![1.0, 0.0, 0.0, 0.0], 44100.0, SignalType::Energy).unwrap();
//! assert_eq!(signal.n_bins(), 3);
//!
//! // The spectrum is computed once and cached.
//! let spectrum = signal.freq().unwrap().to_owned();
//! assert_eq!(spectrum.shape(), &[1, 3]);
//!
//! signal.set_domain(Domain::Frequency).unwrap();
//! assert_eq!(signal.domain(), Domain::Frequency);
//! ```

use ndarray::{Array, Array1, ArrayD, ArrayViewD, CowArray, Dimension, IxDyn};
use num_complex::Complex64;
use tracing::debug;

use crate::operations::transforms::{self, irfft, rfft};
use crate::repr::{SampleBuffer, find_nearest};
use crate::utils::audio_math::to_db;
use crate::views::SampleData;
use crate::{Domain, SignalError, SignalResult, SignalType};

/// Two-slot cache holding the time and the frequency representation.
///
/// `Some` marks a fresh slot. At least the slot of the authoritative domain is
/// always fresh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainCache {
    time: Option<ArrayD<f64>>,
    freq: Option<ArrayD<Complex64>>,
}

impl DomainCache {
    /// Whether the slot of `domain` holds up to date data.
    pub const fn is_fresh(&self, domain: Domain) -> bool {
        match domain {
            Domain::Time => self.time.is_some(),
            Domain::Frequency => self.freq.is_some(),
        }
    }

    fn write_time(&mut self, data: ArrayD<f64>) {
        self.time = Some(data);
        self.freq = None;
    }

    fn write_freq(&mut self, data: ArrayD<Complex64>) {
        self.freq = Some(data);
        self.time = None;
    }
}

/// Uniformly sampled multi-channel signal readable in time and frequency domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    sampling_rate: f64,
    n_samples: usize,
    cshape: Vec<usize>,
    signal_type: SignalType,
    domain: Domain,
    cache: DomainCache,
}

fn check_sampling_rate(sampling_rate: f64) -> SignalResult<()> {
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(SignalError::invalid_parameter(
            "sampling_rate",
            format!("must be finite and > 0, got {sampling_rate}"),
        ));
    }
    Ok(())
}

impl Signal {
    /// Creates a time domain signal.
    ///
    /// A one dimensional array becomes a single channel signal.
    ///
    /// # Errors
    /// Returns an error for a non-positive sampling rate or empty data.
    pub fn new<D: Dimension>(
        data: Array<f64, D>,
        sampling_rate: f64,
        signal_type: SignalType,
    ) -> SignalResult<Self> {
        check_sampling_rate(sampling_rate)?;
        let buffer = SampleBuffer::new(data)?;
        let mut cache = DomainCache::default();
        let n_samples = buffer.n_samples();
        let cshape = buffer.cshape().to_vec();
        cache.write_time(buffer.into_inner());
        Ok(Self {
            sampling_rate,
            n_samples,
            cshape,
            signal_type,
            domain: Domain::Time,
            cache,
        })
    }

    /// Creates a frequency domain signal from a one-sided spectrum.
    ///
    /// `n_samples` is the length of the corresponding time signal and must
    /// satisfy `n_bins == n_samples / 2 + 1`.
    ///
    /// # Errors
    /// Returns an error for a non-positive sampling rate, for `n_samples == 0`
    /// or for a bin count that does not belong to `n_samples`.
    pub fn from_spectrum<D: Dimension>(
        data: Array<Complex64, D>,
        sampling_rate: f64,
        n_samples: usize,
        signal_type: SignalType,
    ) -> SignalResult<Self> {
        check_sampling_rate(sampling_rate)?;
        if n_samples == 0 {
            return Err(SignalError::invalid_parameter(
                "n_samples",
                "a spectrum must belong to at least one time sample",
            ));
        }
        let buffer = SampleBuffer::new(data)?;
        if buffer.n_samples() != transforms::n_bins(n_samples) {
            return Err(SignalError::dimension_mismatch(
                "frequency bins",
                &[transforms::n_bins(n_samples)],
                &[buffer.n_samples()],
            ));
        }
        let cshape = buffer.cshape().to_vec();
        let mut cache = DomainCache::default();
        cache.write_freq(buffer.into_inner());
        Ok(Self {
            sampling_rate,
            n_samples,
            cshape,
            signal_type,
            domain: Domain::Frequency,
            cache,
        })
    }

    /// Sampling rate in Hz.
    pub const fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Number of time samples.
    pub const fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of bins of the one-sided spectrum.
    pub const fn n_bins(&self) -> usize {
        transforms::n_bins(self.n_samples)
    }

    /// Energy or power convention used for the FFT normalization.
    pub const fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    /// The authoritative domain.
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// The cache of both representations.
    pub const fn cache(&self) -> &DomainCache {
        &self.cache
    }

    /// Sampling times in seconds, `n / sampling_rate`.
    pub fn times(&self) -> Array1<f64> {
        Array1::from_iter((0..self.n_samples).map(|n| n as f64 / self.sampling_rate))
    }

    /// Bin frequencies in Hz, `k * sampling_rate / n_samples`.
    pub fn frequencies(&self) -> Array1<f64> {
        let resolution = self.sampling_rate / self.n_samples as f64;
        Array1::from_iter((0..self.n_bins()).map(|k| k as f64 * resolution))
    }

    /// Time of the last sample in seconds.
    pub fn signal_length(&self) -> f64 {
        (self.n_samples - 1) as f64 / self.sampling_rate
    }

    /// Makes `domain` authoritative.
    ///
    /// Setting the current domain is a no-op. Otherwise the target slot is
    /// filled if it is stale.
    pub fn set_domain(&mut self, domain: Domain) -> SignalResult<()> {
        if domain == self.domain {
            return Ok(());
        }
        self.refresh(domain)?;
        debug!(from = %self.domain, to = %domain, "switched signal domain");
        self.domain = domain;
        Ok(())
    }

    /// Changes the FFT normalization convention.
    ///
    /// The time data is kept, the spectrum is recomputed with the new convention.
    pub fn set_signal_type(&mut self, signal_type: SignalType) -> SignalResult<()> {
        if signal_type == self.signal_type {
            return Ok(());
        }
        self.refresh(Domain::Time)?;
        self.cache.freq = None;
        self.signal_type = signal_type;
        if self.domain == Domain::Frequency {
            self.refresh(Domain::Frequency)?;
        }
        Ok(())
    }

    /// Fills the slot of `domain` from the other one if it is stale.
    fn refresh(&mut self, domain: Domain) -> SignalResult<()> {
        if self.cache.is_fresh(domain) {
            return Ok(());
        }
        match domain {
            Domain::Time => {
                let time = self.convert_to_time()?;
                self.cache.time = Some(time);
            }
            Domain::Frequency => {
                let freq = self.convert_to_freq()?;
                self.cache.freq = Some(freq);
            }
        }
        Ok(())
    }

    fn convert_to_time(&self) -> SignalResult<ArrayD<f64>> {
        let spectrum = self.cache.freq.as_ref().ok_or_else(|| {
            SignalError::Transform("no frequency data to derive time data from".to_string())
        })?;
        debug!(n_samples = self.n_samples, "computing time data from spectrum");
        irfft(spectrum.view(), self.n_samples, self.signal_type)
    }

    fn convert_to_freq(&self) -> SignalResult<ArrayD<Complex64>> {
        let time = self.cache.time.as_ref().ok_or_else(|| {
            SignalError::Transform("no time data to derive a spectrum from".to_string())
        })?;
        debug!(n_samples = self.n_samples, "computing spectrum from time data");
        rfft(time.view(), self.signal_type)
    }

    /// Time data, converting and caching it if necessary.
    pub fn time(&mut self) -> SignalResult<ArrayViewD<'_, f64>> {
        self.refresh(Domain::Time)?;
        match &self.cache.time {
            Some(time) => Ok(time.view()),
            None => Err(SignalError::Transform("time data unavailable".to_string())),
        }
    }

    /// Spectrum, converting and caching it if necessary.
    pub fn freq(&mut self) -> SignalResult<ArrayViewD<'_, Complex64>> {
        self.refresh(Domain::Frequency)?;
        match &self.cache.freq {
            Some(freq) => Ok(freq.view()),
            None => Err(SignalError::Transform("spectrum unavailable".to_string())),
        }
    }

    /// Time data without touching the cache.
    ///
    /// Borrows the cached array when it is fresh and converts otherwise.
    pub fn time_view(&self) -> SignalResult<CowArray<'_, f64, IxDyn>> {
        match &self.cache.time {
            Some(time) => Ok(CowArray::from(time.view())),
            None => Ok(CowArray::from(self.convert_to_time()?)),
        }
    }

    /// Spectrum without touching the cache.
    pub fn freq_view(&self) -> SignalResult<CowArray<'_, Complex64, IxDyn>> {
        match &self.cache.freq {
            Some(freq) => Ok(CowArray::from(freq.view())),
            None => Ok(CowArray::from(self.convert_to_freq()?)),
        }
    }

    /// Replaces the time data and makes the time domain authoritative.
    ///
    /// The number of samples may change; the cached spectrum is dropped.
    pub fn set_time<D: Dimension>(&mut self, data: Array<f64, D>) -> SignalResult<()> {
        let buffer = SampleBuffer::new(data)?;
        self.n_samples = buffer.n_samples();
        self.cshape = buffer.cshape().to_vec();
        self.cache.write_time(buffer.into_inner());
        self.domain = Domain::Time;
        Ok(())
    }

    /// Replaces the spectrum and makes the frequency domain authoritative.
    ///
    /// The number of bins must match the current number of samples; the
    /// cached time data is dropped.
    pub fn set_freq<D: Dimension>(&mut self, data: Array<Complex64, D>) -> SignalResult<()> {
        let buffer = SampleBuffer::new(data)?;
        if buffer.n_samples() != self.n_bins() {
            return Err(SignalError::dimension_mismatch(
                "frequency bins",
                &[self.n_bins()],
                &[buffer.n_samples()],
            ));
        }
        self.cshape = buffer.cshape().to_vec();
        self.cache.write_freq(buffer.into_inner());
        self.domain = Domain::Frequency;
        Ok(())
    }

    /// Index of the sample closest to `time` seconds.
    pub fn find_nearest_time(&self, time: f64) -> usize {
        find_nearest(self.times().view(), time)
    }

    /// Indices of the samples closest to each of `times`.
    pub fn find_nearest_times(&self, times: &[f64]) -> Vec<usize> {
        let axis = self.times();
        times.iter().map(|&t| find_nearest(axis.view(), t)).collect()
    }

    /// Index of the bin closest to `frequency` Hz.
    pub fn find_nearest_frequency(&self, frequency: f64) -> usize {
        find_nearest(self.frequencies().view(), frequency)
    }

    /// Indices of the bins closest to each of `frequencies`.
    pub fn find_nearest_frequencies(&self, frequencies: &[f64]) -> Vec<usize> {
        let axis = self.frequencies();
        frequencies
            .iter()
            .map(|&f| find_nearest(axis.view(), f))
            .collect()
    }

    /// Time data in decibels, `log_prefix * log10(|x| / log_reference)`.
    pub fn time_db(&self, log_prefix: f64, log_reference: f64) -> SignalResult<ArrayD<f64>> {
        let time = self.time_view()?;
        Ok(to_db(time.view(), log_prefix, log_reference))
    }

    /// Magnitude spectrum in decibels, `log_prefix * log10(|X| / log_reference)`.
    pub fn freq_db(&self, log_prefix: f64, log_reference: f64) -> SignalResult<ArrayD<f64>> {
        let freq = self.freq_view()?;
        let magnitude = freq.mapv(|c| c.norm());
        Ok(to_db(magnitude.view(), log_prefix, log_reference))
    }

    fn map_slots(
        &self,
        f_time: impl Fn(&ArrayD<f64>) -> SignalResult<ArrayD<f64>>,
        f_freq: impl Fn(&ArrayD<Complex64>) -> SignalResult<ArrayD<Complex64>>,
        cshape: Vec<usize>,
    ) -> SignalResult<Self> {
        let cache = DomainCache {
            time: self.cache.time.as_ref().map(f_time).transpose()?,
            freq: self.cache.freq.as_ref().map(f_freq).transpose()?,
        };
        Ok(Self {
            sampling_rate: self.sampling_rate,
            n_samples: self.n_samples,
            cshape,
            signal_type: self.signal_type,
            domain: self.domain,
            cache,
        })
    }
}

impl SampleData for Signal {
    fn cshape(&self) -> &[usize] {
        &self.cshape
    }

    fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Reshapes every fresh slot of the cache.
    fn reshape(&self, new_cshape: &[isize]) -> SignalResult<Self> {
        let cshape = crate::repr::resolve_cshape(&self.cshape, new_cshape)?;
        self.map_slots(
            |time| reshape_slot(time, &cshape),
            |freq| reshape_slot(freq, &cshape),
            cshape.clone(),
        )
    }
}

fn reshape_slot<T: Clone>(data: &ArrayD<T>, cshape: &[usize]) -> SignalResult<ArrayD<T>> {
    let mut shape = cshape.to_vec();
    shape.push(data.shape()[data.ndim() - 1]);
    Ok(data
        .to_shape((shape, ndarray::Order::RowMajor))?
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::{Array2, Array3, array};

    fn noise(shape: (usize, usize, usize)) -> Array3<f64> {
        Array3::from_shape_fn(shape, |(a, b, s)| {
            ((a * 7 + b * 3 + s) as f64 * 0.37).sin()
        })
    }

    #[test]
    fn test_signal_init() {
        let mut signal = Signal::new(array![1.0, 0.0, -1.0, 0.0], 4.0, SignalType::Energy).unwrap();
        assert_eq!(signal.sampling_rate(), 4.0);
        assert_eq!(signal.n_samples(), 4);
        assert_eq!(signal.n_bins(), 3);
        assert_eq!(signal.cshape(), &[1]);
        assert_eq!(signal.domain(), Domain::Time);
        assert_eq!(signal.signal_type(), SignalType::Energy);
        assert_eq!(signal.times(), array![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(signal.frequencies(), array![0.0, 1.0, 2.0]);
        assert_eq!(signal.signal_length(), 0.75);
        assert_eq!(
            signal.time().unwrap(),
            array![[1.0, 0.0, -1.0, 0.0]].into_dyn().view()
        );
    }

    #[test]
    fn test_signal_rejects_bad_sampling_rate() {
        for fs in [0.0, -44100.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Signal::new(array![1.0, 0.0], fs, SignalType::Energy),
                Err(SignalError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_set_domain_same_value_is_noop() {
        let mut signal = Signal::new(array![1.0, 0.0, 0.0], 10.0, SignalType::Energy).unwrap();
        let before = signal.clone();
        signal.set_domain(Domain::Time).unwrap();
        assert_eq!(signal, before);
        assert!(!signal.cache().is_fresh(Domain::Frequency));
    }

    #[test]
    fn test_domain_switch_fills_cache_and_round_trips() {
        let data = noise((2, 3, 16));
        let mut signal = Signal::new(data.clone(), 48000.0, SignalType::Power).unwrap();
        signal.set_domain(Domain::Frequency).unwrap();
        assert!(signal.cache().is_fresh(Domain::Time));
        assert!(signal.cache().is_fresh(Domain::Frequency));
        assert_eq!(signal.freq().unwrap().shape(), &[2, 3, 9]);

        let spectrum = signal.freq().unwrap().to_owned();
        let mut from_freq =
            Signal::from_spectrum(spectrum, 48000.0, 16, SignalType::Power).unwrap();
        assert_eq!(from_freq.domain(), Domain::Frequency);
        assert!(!from_freq.cache().is_fresh(Domain::Time));
        let time = from_freq.time().unwrap().to_owned();
        for (a, b) in time.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
        assert!(from_freq.cache().is_fresh(Domain::Time));
    }

    #[test]
    fn test_views_do_not_fill_cache() {
        let signal = Signal::new(array![1.0, 0.0, 0.0, 0.0], 8.0, SignalType::Energy).unwrap();
        let spectrum = signal.freq_view().unwrap();
        assert!(spectrum.is_owned());
        assert_eq!(spectrum.shape(), &[1, 3]);
        assert!(!signal.cache().is_fresh(Domain::Frequency));
        assert!(signal.time_view().unwrap().is_view());
    }

    #[test]
    fn test_writing_one_domain_invalidates_the_other() {
        let mut signal = Signal::new(array![1.0, 0.0, 0.0, 0.0], 8.0, SignalType::Energy).unwrap();
        signal.freq().unwrap();
        assert!(signal.cache().is_fresh(Domain::Frequency));

        signal.set_time(array![0.0, 1.0, 0.0, 0.0]).unwrap();
        assert!(!signal.cache().is_fresh(Domain::Frequency));
        assert_eq!(signal.domain(), Domain::Time);

        let flat = Array2::from_elem((1, 3), Complex64::new(2.0, 0.0));
        signal.set_freq(flat).unwrap();
        assert_eq!(signal.domain(), Domain::Frequency);
        assert!(!signal.cache().is_fresh(Domain::Time));
        let time = signal.time().unwrap();
        assert_approx_eq!(time[[0, 0]], 2.0, 1e-12);

        let wrong = Array2::from_elem((1, 5), Complex64::new(1.0, 0.0));
        assert!(signal.set_freq(wrong).is_err());
    }

    #[test]
    fn test_from_spectrum_checks_bins() {
        let spectrum = Array2::from_elem((1, 4), Complex64::new(1.0, 0.0));
        assert!(matches!(
            Signal::from_spectrum(spectrum, 100.0, 10, SignalType::Energy),
            Err(SignalError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_from_spectrum_rejects_zero_samples() {
        let spectrum = Array2::from_elem((1, 1), Complex64::new(1.0, 0.0));
        match Signal::from_spectrum(spectrum, 100.0, 0, SignalType::Energy) {
            Err(SignalError::InvalidParameter(msg)) => assert!(msg.contains("n_samples")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_signal_type_change_rescales_spectrum() {
        let mut signal = Signal::new(array![1.0, 1.0, 1.0, 1.0], 4.0, SignalType::Energy).unwrap();
        assert_approx_eq!(signal.freq().unwrap()[[0, 0]].re, 4.0, 1e-12);
        signal.set_signal_type(SignalType::Power).unwrap();
        assert!(!signal.cache().is_fresh(Domain::Frequency));
        assert_approx_eq!(signal.freq().unwrap()[[0, 0]].re, 1.0, 1e-12);
        assert_approx_eq!(signal.time().unwrap()[[0, 2]], 1.0, 1e-12);
    }

    #[test]
    fn test_signal_reshape_and_flatten() {
        let data = noise((6, 1, 8)).into_shape_with_order((6, 8)).unwrap();
        let mut signal = Signal::new(data.clone(), 100.0, SignalType::Energy).unwrap();
        signal.freq().unwrap();

        let mut reshaped = signal.reshape(&[3, 2]).unwrap();
        assert_eq!(reshaped.cshape(), &[3, 2]);
        assert_eq!(reshaped.freq().unwrap().shape(), &[3, 2, 5]);
        assert_eq!(
            reshaped.time().unwrap(),
            data.clone().into_shape_with_order((3, 2, 8)).unwrap().into_dyn().view()
        );

        let back = reshaped.reshape(&[-1]).unwrap();
        assert_eq!(back, signal);
        assert_eq!(back.flatten().unwrap(), signal);
        assert!(signal.reshape(&[4, 2]).is_err());
    }

    #[test]
    fn test_signal_find_nearest() {
        let signal = Signal::new(Array2::<f64>::zeros((1, 10)), 10.0, SignalType::Energy).unwrap();
        assert_eq!(signal.find_nearest_time(0.33), 3);
        assert_eq!(signal.find_nearest_times(&[0.0, 5.0]), vec![0, 9]);
        assert_eq!(signal.find_nearest_frequency(2.4), 2);
        assert_eq!(signal.find_nearest_frequencies(&[0.6, 100.0]), vec![1, 5]);
    }

    #[test]
    fn test_db_accessors() {
        let signal = Signal::new(array![10.0, 1.0, 0.1, 0.0], 4.0, SignalType::Energy).unwrap();
        let db = signal.time_db(20.0, 1.0).unwrap();
        assert_approx_eq!(db[[0, 0]], 20.0, 1e-12);
        assert!(db[[0, 1]].abs() < 1e-12);
        assert_approx_eq!(db[[0, 2]], -20.0, 1e-12);
        assert!(db[[0, 3]].is_finite());

        let spectrum_db = signal.freq_db(20.0, 1.0).unwrap();
        assert_eq!(spectrum_db.shape(), &[1, 3]);
    }
}
