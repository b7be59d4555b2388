//! Single-domain data types.
//!
//! [`TimeData`] holds samples over (possibly non-uniform) sampling times and
//! [`FrequencyData`] holds a one-sided spectrum over frequencies. They share
//! the domain agnostic operations through the [`SampleData`] trait and expose
//! only the accessors of their own domain.
//!
//! Asking a time-only object for frequency data does not compile:
//!
//! ```rust,compile_fail
//! use acoustic_signals::TimeData;
//! use ndarray::array;
//!
//! let time = TimeData::new(array![1.0, 0.0, -1.0], vec![0.0, 0.1, 0.3]).unwrap();
//! let _ = time.frequencies();
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::TimeData;
//! use ndarray::array;
//!
//! let time = TimeData::new(array![1.0, 0.0, -1.0], vec![0.0, 0.1, 0.3]).unwrap();
//! let _ = time.n_bins();
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::TimeData;
//! use ndarray::array;
//!
//! let time = TimeData::new(array![1.0, 0.0, -1.0], vec![0.0, 0.1, 0.3]).unwrap();
//! let _ = time.freq();
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::TimeData;
//! use ndarray::array;
//!
//! let time = TimeData::new(array![1.0, 0.0, -1.0], vec![0.0, 0.1, 0.3]).unwrap();
//! let _ = time.find_nearest_frequency(100.0);
//! ```
//!
//! Neither view has a sampling rate or a mutable domain:
//!
//! ```rust,compile_fail
//! use acoustic_signals::{Domain, TimeData};
//! use ndarray::array;
//!
//! let mut time = TimeData::new(array![1.0, 0.0, -1.0], vec![0.0, 0.1, 0.3]).unwrap();
//! time.set_domain(Domain::Time);
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::TimeData;
//! use ndarray::array;
//!
//! let time = TimeData::new(array![1.0, 0.0, -1.0], vec![0.0, 0.1, 0.3]).unwrap();
//! let _ = time.sampling_rate();
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::FrequencyData;
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let freq = FrequencyData::new(array![Complex64::new(1.0, 0.0)], vec![0.0]).unwrap();
//! let _ = freq.sampling_rate();
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::FrequencyData;
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let freq = FrequencyData::new(array![Complex64::new(1.0, 0.0)], vec![0.0]).unwrap();
//! let _ = freq.time();
//! ```
//!
//! ```rust,compile_fail
//! use acoustic_signals::FrequencyData;
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let freq = FrequencyData::new(array![Complex64::new(1.0, 0.0)], vec![0.0]).unwrap();
//! let _ = freq.find_nearest_time(0.1);
//! ```
//!
//! The shared operations work on both:
//!
//! ```rust
//! use acoustic_signals::{SampleData, TimeData};
//! use ndarray::Array2;
//!
//! let time = TimeData::new(Array2::<f64>::zeros((6, 4)), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
//! let grid = time.reshape(&[3, 2]).unwrap();
//! assert_eq!(grid.cshape(), &[3, 2]);
//! assert_eq!(grid.flatten().unwrap().cshape(), &[6]);
//! ```

use ndarray::{Array, Array1, ArrayView1, ArrayViewD, Dimension};
use num_complex::Complex64;

use crate::repr::{Domain, SampleBuffer, find_nearest};
use crate::{SignalError, SignalResult};

/// Common interface for sampled data regardless of its domain.
///
/// This trait allows functions to work with [`TimeData`], [`FrequencyData`]
/// and [`crate::Signal`] without requiring separate implementations.
pub trait SampleData: Sized {
    /// Channel shape, every axis except the trailing sample axis.
    fn cshape(&self) -> &[usize];

    /// Number of entries along the sample axis.
    fn n_samples(&self) -> usize;

    /// Returns a copy with the channel shape `new_cshape`, see [`SampleBuffer::reshape`].
    fn reshape(&self, new_cshape: &[isize]) -> SignalResult<Self>;

    /// Alias of [`SampleData::cshape`].
    fn shape(&self) -> &[usize] {
        self.cshape()
    }

    /// Total number of channels.
    fn n_channels(&self) -> usize {
        self.cshape().iter().product()
    }

    /// Returns a copy with one leading channel dimension.
    fn flatten(&self) -> SignalResult<Self> {
        let n_channels = isize::try_from(self.n_channels())
            .map_err(|_| SignalError::shape("channel count does not fit into isize"))?;
        self.reshape(&[n_channels])
    }
}

fn check_axis_len(what: &str, axis_len: usize, n_samples: usize) -> SignalResult<()> {
    if axis_len != n_samples {
        return Err(SignalError::dimension_mismatch(what, &[n_samples], &[axis_len]));
    }
    Ok(())
}

/// Samples taken at arbitrary, non-decreasing times.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeData {
    buffer: SampleBuffer<f64>,
    times: Array1<f64>,
}

impl TimeData {
    /// Creates time data from samples and their sampling times in seconds.
    ///
    /// # Errors
    /// Returns [`SignalError::DimensionMismatch`] if the number of times is not
    /// the number of samples.
    pub fn new<D: Dimension>(
        data: Array<f64, D>,
        times: impl Into<Array1<f64>>,
    ) -> SignalResult<Self> {
        let buffer = SampleBuffer::new(data)?;
        let times = times.into();
        check_axis_len("times", times.len(), buffer.n_samples())?;
        Ok(Self { buffer, times })
    }

    /// Always [`Domain::Time`].
    pub const fn domain(&self) -> Domain {
        Domain::Time
    }

    /// The samples, shape `cshape + [n_samples]`.
    pub fn time(&self) -> ArrayViewD<'_, f64> {
        self.buffer.view()
    }

    /// Replaces the samples, keeping the sampling times.
    pub fn set_time<D: Dimension>(&mut self, data: Array<f64, D>) -> SignalResult<()> {
        let buffer = SampleBuffer::new(data)?;
        check_axis_len("time data", buffer.n_samples(), self.times.len())?;
        self.buffer = buffer;
        Ok(())
    }

    /// Sampling times in seconds.
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// The last sampling time.
    pub fn signal_length(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Index of the sampling time closest to `time`.
    pub fn find_nearest_time(&self, time: f64) -> usize {
        find_nearest(self.times.view(), time)
    }

    /// Indices of the sampling times closest to each of `times`.
    pub fn find_nearest_times(&self, times: &[f64]) -> Vec<usize> {
        times.iter().map(|&t| self.find_nearest_time(t)).collect()
    }
}

impl SampleData for TimeData {
    fn cshape(&self) -> &[usize] {
        self.buffer.cshape()
    }

    fn n_samples(&self) -> usize {
        self.buffer.n_samples()
    }

    fn reshape(&self, new_cshape: &[isize]) -> SignalResult<Self> {
        Ok(Self {
            buffer: self.buffer.reshape(new_cshape)?,
            times: self.times.clone(),
        })
    }
}

/// One-sided spectrum sampled at arbitrary frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyData {
    buffer: SampleBuffer<Complex64>,
    frequencies: Array1<f64>,
}

impl FrequencyData {
    /// Creates frequency data from spectral values and their frequencies in Hz.
    ///
    /// # Errors
    /// Returns [`SignalError::DimensionMismatch`] if the number of frequencies is
    /// not the number of bins.
    pub fn new<D: Dimension>(
        data: Array<Complex64, D>,
        frequencies: impl Into<Array1<f64>>,
    ) -> SignalResult<Self> {
        let buffer = SampleBuffer::new(data)?;
        let frequencies = frequencies.into();
        check_axis_len("frequencies", frequencies.len(), buffer.n_samples())?;
        Ok(Self {
            buffer,
            frequencies,
        })
    }

    /// Always [`Domain::Frequency`].
    pub const fn domain(&self) -> Domain {
        Domain::Frequency
    }

    /// The spectrum, shape `cshape + [n_bins]`.
    pub fn freq(&self) -> ArrayViewD<'_, Complex64> {
        self.buffer.view()
    }

    /// Replaces the spectrum, keeping the frequencies.
    pub fn set_freq<D: Dimension>(&mut self, data: Array<Complex64, D>) -> SignalResult<()> {
        let buffer = SampleBuffer::new(data)?;
        check_axis_len("frequency data", buffer.n_samples(), self.frequencies.len())?;
        self.buffer = buffer;
        Ok(())
    }

    /// Frequencies in Hz.
    pub fn frequencies(&self) -> ArrayView1<'_, f64> {
        self.frequencies.view()
    }

    /// Number of frequency bins.
    pub fn n_bins(&self) -> usize {
        self.buffer.n_samples()
    }

    /// Index of the frequency closest to `frequency`.
    pub fn find_nearest_frequency(&self, frequency: f64) -> usize {
        find_nearest(self.frequencies.view(), frequency)
    }

    /// Indices of the frequencies closest to each of `frequencies`.
    pub fn find_nearest_frequencies(&self, frequencies: &[f64]) -> Vec<usize> {
        frequencies
            .iter()
            .map(|&f| self.find_nearest_frequency(f))
            .collect()
    }
}

impl SampleData for FrequencyData {
    fn cshape(&self) -> &[usize] {
        self.buffer.cshape()
    }

    fn n_samples(&self) -> usize {
        self.buffer.n_samples()
    }

    fn reshape(&self, new_cshape: &[isize]) -> SignalResult<Self> {
        Ok(Self {
            buffer: self.buffer.reshape(new_cshape)?,
            frequencies: self.frequencies.clone(),
        })
    }
}
