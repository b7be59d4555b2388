//! Core sample representation shared by every signal type.
//!
//! This module provides the fundamental building block for representing sampled
//! data within `acoustic_signals`: a [`SampleBuffer`] wrapping an `ndarray`
//! array whose last axis is the sample axis and whose leading axes form the
//! *channel shape* (`cshape`).
//!
//! # Layout
//!
//! A buffer of shape `(2, 3, 512)` holds six channels arranged as a `2 × 3`
//! grid, each with 512 samples. Its `cshape` is `[2, 3]` and its
//! `n_samples` is 512. The total element count is always
//! `product(cshape) * n_samples`.
//!
//! A one dimensional input is promoted to a single channel, so
//! `[1.0, 0.0, -1.0]` becomes a `(1, 3)` buffer.
//!
//! ```rust
//! use acoustic_signals::SampleBuffer;
//! use ndarray::array;
//!
//! let buffer = SampleBuffer::new(array![1.0, 0.0, -1.0]).unwrap();
//! assert_eq!(buffer.cshape(), &[1]);
//! assert_eq!(buffer.n_samples(), 3);
//!
//! let grid = SampleBuffer::new(ndarray::Array3::<f64>::zeros((2, 3, 8))).unwrap();
//! let flat = grid.flatten().unwrap();
//! assert_eq!(flat.cshape(), &[6]);
//! ```
//!
//! Every transformation returns a new buffer, the source is never touched.

use std::fmt::Display;
use std::str::FromStr;

use ndarray::{Array, ArrayD, ArrayView1, ArrayView2, ArrayViewD, Axis, Dimension, Order};

use crate::{SignalError, SignalResult};

/// Which representation of a signal is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    /// Sampled over time.
    #[default]
    Time,
    /// One-sided spectrum sampled over frequency.
    Frequency,
}

impl Domain {
    /// Returns the other domain.
    pub const fn other(self) -> Self {
        match self {
            Domain::Time => Domain::Frequency,
            Domain::Frequency => Domain::Time,
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Time => write!(f, "time"),
            Domain::Frequency => write!(f, "freq"),
        }
    }
}

impl FromStr for Domain {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "time" => Ok(Domain::Time),
            "freq" | "frequency" => Ok(Domain::Frequency),
            other => Err(SignalError::invalid_parameter(
                "domain",
                format!("unknown domain '{other}', expected 'time' or 'freq'"),
            )),
        }
    }
}

/// FFT normalization convention of a signal.
///
/// Energy signals (impulse responses, transients) use the plain transform.
/// Power signals (stationary noise, sines) use an RMS scaled single-sided
/// spectrum, see [`crate::operations::transforms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalType {
    /// Finite energy signal.
    #[default]
    Energy,
    /// Finite power signal.
    Power,
}

impl Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalType::Energy => write!(f, "energy"),
            SignalType::Power => write!(f, "power"),
        }
    }
}

impl FromStr for SignalType {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "energy" => Ok(SignalType::Energy),
            "power" => Ok(SignalType::Power),
            other => Err(SignalError::invalid_parameter(
                "signal_type",
                format!("unknown signal type '{other}', expected 'energy' or 'power'"),
            )),
        }
    }
}

/// Sample-indexed array with a leading channel shape and a trailing sample axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer<T> {
    data: ArrayD<T>,
}

impl<T: Clone> SampleBuffer<T> {
    /// Wraps `data`, promoting a one dimensional array to a single channel.
    ///
    /// # Errors
    /// Returns [`SignalError::Shape`] for zero dimensional input or when the
    /// sample axis is empty.
    pub fn new<D: Dimension>(data: Array<T, D>) -> SignalResult<Self> {
        let data = data.into_dyn();
        let data = match data.ndim() {
            0 => {
                return Err(SignalError::shape(
                    "sample data needs at least one dimension",
                ));
            }
            1 => data.insert_axis(Axis(0)),
            _ => data,
        };
        if data.shape().last().copied().unwrap_or(0) == 0 {
            return Err(SignalError::shape("sample data must not be empty"));
        }
        Ok(Self {
            data: data.as_standard_layout().into_owned(),
        })
    }

    /// Channel shape: every axis except the trailing sample axis.
    pub fn cshape(&self) -> &[usize] {
        let shape = self.data.shape();
        &shape[..shape.len() - 1]
    }

    /// Number of samples along the last axis.
    pub fn n_samples(&self) -> usize {
        self.data.shape()[self.data.ndim() - 1]
    }

    /// Total number of channels, the product of the channel shape.
    pub fn n_channels(&self) -> usize {
        self.cshape().iter().product()
    }

    /// Borrow the underlying array.
    pub const fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Read-only view of the underlying array.
    pub fn view(&self) -> ArrayViewD<'_, T> {
        self.data.view()
    }

    /// Consumes the buffer and returns the array.
    pub fn into_inner(self) -> ArrayD<T> {
        self.data
    }

    /// View the data as `(n_channels, n_samples)`.
    pub fn channels_view(&self) -> SignalResult<ArrayView2<'_, T>> {
        Ok(self
            .data
            .view()
            .into_shape_with_order((self.n_channels(), self.n_samples()))?)
    }

    /// Returns a new buffer with the channel shape `new_cshape`.
    ///
    /// At most one entry may be `-1`, its size is inferred from the
    /// remaining dimensions. The sample axis is left untouched.
    ///
    /// # Errors
    /// Returns [`SignalError::Shape`] if the element counts disagree or the
    /// requested shape is malformed.
    pub fn reshape(&self, new_cshape: &[isize]) -> SignalResult<Self> {
        let mut shape = resolve_cshape(self.cshape(), new_cshape)?;
        shape.push(self.n_samples());
        let data = self.data.to_shape((shape, Order::RowMajor))?.into_owned();
        Ok(Self { data })
    }

    /// Returns a new buffer with a single leading channel dimension.
    pub fn flatten(&self) -> SignalResult<Self> {
        let n_channels = isize::try_from(self.n_channels())
            .map_err(|_| SignalError::shape("channel count does not fit into isize"))?;
        self.reshape(&[n_channels])
    }
}

/// Resolves a requested channel shape against the current one.
///
/// `-1` marks the single inferred dimension. The result always has the same
/// number of channels as `current`.
pub fn resolve_cshape(current: &[usize], requested: &[isize]) -> SignalResult<Vec<usize>> {
    let mismatch =
        || SignalError::shape(format!("Can not reshape signal of cshape {current:?} to {requested:?}"));

    let total: usize = current.iter().product();
    let mut inferred = None;
    let mut known = 1usize;
    for (idx, &dim) in requested.iter().enumerate() {
        match dim {
            -1 if inferred.is_none() => inferred = Some(idx),
            -1 => {
                return Err(SignalError::shape(format!(
                    "Only one dimension of {requested:?} can be inferred"
                )));
            }
            d if d < 0 => {
                return Err(SignalError::shape(format!(
                    "Invalid dimension {d} in {requested:?}"
                )));
            }
            d => {
                known = known
                    .checked_mul(d.unsigned_abs())
                    .ok_or_else(mismatch)?;
            }
        }
    }

    let mut shape: Vec<usize> = requested.iter().map(|d| d.unsigned_abs()).collect();
    match inferred {
        Some(idx) => {
            if known == 0 || total % known != 0 {
                return Err(mismatch());
            }
            shape[idx] = total / known;
        }
        None if known != total => return Err(mismatch()),
        None => {}
    }
    Ok(shape)
}

/// Index of the entry in `axis` closest to `value`.
///
/// Ties resolve to the lower index. Returns 0 for an empty axis.
pub fn find_nearest(axis: ArrayView1<'_, f64>, value: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (idx, &entry) in axis.iter().enumerate() {
        let distance = (entry - value).abs();
        if distance < best_distance {
            best = idx;
            best_distance = distance;
        }
    }
    best
}
