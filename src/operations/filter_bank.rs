//! FIR, IIR and second order section filter banks.
//!
//! A [`Filter`] holds one or more filters of the same [`FilterKind`] in the
//! canonical layout `(n_filters, n_rows, n_coeffs)` produced by
//! [`atleast_3d_first_dim`]. Processing evaluates the difference equation
//!
//! ```text
//! a0*y[n] = b0*x[n] + b1*x[n-1] + ... - a1*y[n-1] - a2*y[n-2] - ...
//! ```
//!
//! in transposed direct form II for every filter and every channel of a
//! [`Signal`]. A bank with a single filter keeps the channel shape of the
//! signal; a bank with `F > 1` filters adds a leading axis of size `F`.
//!
//! ```rust
//! use acoustic_signals::Filter;
//! use acoustic_signals::utils::generation::impulse;
//! use ndarray::array;
//!
//! let mut filter = Filter::iir(array![[1.0, 0.5, 0.0], [1.0, 0.125, 0.0]]).unwrap();
//! let signal = impulse(8, 2000.0, &[1], 1.0, 0).unwrap();
//!
//! let mut filtered = filter.process(&signal).unwrap();
//! let time = filtered.time().unwrap();
//! assert_eq!(time[[0, 0]], 1.0);
//! assert_eq!(time[[0, 1]], 0.375);
//! assert_eq!(time[[0, 2]], -0.046875);
//! ```

use std::fmt::Display;

use ndarray::{
    Array, Array2, Array3, ArrayD, ArrayView1, ArrayViewMut1, ArrayViewMut4, Axis, Dimension,
    Ix3, Ix4, IxDyn, s,
};
use tracing::{debug, trace};

use crate::operations::shape::atleast_3d_first_dim;
use crate::operations::types::FilterKind;
use crate::views::SampleData;
use crate::{Signal, SignalError, SignalResult};

/// Coefficients of one recursion stage, normalized so that `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
struct Stage {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl Stage {
    fn new(b: ArrayView1<'_, f64>, a: ArrayView1<'_, f64>, location: &str) -> SignalResult<Self> {
        let a0 = a[0];
        if a0 == 0.0 {
            return Err(SignalError::invalid_parameter(
                "coefficients",
                format!("leading denominator coefficient of {location} is zero"),
            ));
        }
        Ok(Self {
            b: b.iter().map(|&v| v / a0).collect(),
            a: a.iter().map(|&v| v / a0).collect(),
        })
    }

    /// Filters `lane` in place, continuing from and updating `z`.
    fn run(&self, mut lane: ArrayViewMut1<'_, f64>, mut z: ArrayViewMut1<'_, f64>) {
        let order = z.len();
        for sample in lane.iter_mut() {
            let x = *sample;
            let y = if order > 0 {
                self.b[0] * x + z[0]
            } else {
                self.b[0] * x
            };
            for i in 0..order {
                let carry = if i + 1 < order { z[i + 1] } else { 0.0 };
                z[i] = self.b[i + 1] * x - self.a[i + 1] * y + carry;
            }
            *sample = y;
        }
    }
}

/// Textual form stored as a filter comment.
///
/// Any printable value is accepted; numbers become their decimal form.
pub fn normalize_comment(value: impl Display) -> String {
    value.to_string()
}

/// Bank of digital filters with optional persisted recursion state.
///
/// State layouts, with `n_channels` the number of channels of the processed
/// signal:
///
/// | kind       | state shape                                   |
/// |------------|-----------------------------------------------|
/// | FIR, IIR   | `(n_filters, n_channels, n_coeffs - 1)`       |
/// | SOS        | `(n_filters, n_sections, n_channels, 2)`      |
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    kind: FilterKind,
    coefficients: Option<Array3<f64>>,
    state: Option<ArrayD<f64>>,
    comment: Option<String>,
}

impl Filter {
    /// Creates a filter bank of `kind`.
    ///
    /// The coefficients are brought to the canonical rank 3 layout. A filter
    /// without coefficients is an empty shell that can not process signals.
    ///
    /// # Errors
    /// - [`SignalError::InvalidParameter`] if a state is given without coefficients
    /// - [`SignalError::Shape`] if the coefficients do not fit `kind`
    pub fn new(
        kind: FilterKind,
        coefficients: Option<ArrayD<f64>>,
        state: Option<ArrayD<f64>>,
    ) -> SignalResult<Self> {
        let coefficients = match coefficients {
            Some(coefficients) => Some(normalize_coefficients(kind, coefficients)?),
            None if state.is_some() => {
                return Err(SignalError::invalid_parameter(
                    "state",
                    "a filter without coefficients can not have a state",
                ));
            }
            None => None,
        };
        if let Some(state) = &state {
            let rank = state_rank(kind);
            if state.ndim() != rank {
                return Err(SignalError::shape(format!(
                    "{kind} state must have rank {rank}, got shape {:?}",
                    state.shape()
                )));
            }
        }
        Ok(Self {
            kind,
            coefficients,
            state,
            comment: None,
        })
    }

    /// FIR filter bank from numerator coefficients.
    ///
    /// A vector is one filter; a matrix holds one filter per row. The
    /// denominator is a unit impulse of the same length.
    pub fn fir<D: Dimension>(b: Array<f64, D>) -> SignalResult<Self> {
        Self::new(FilterKind::Fir, Some(b.into_dyn()), None)
    }

    /// IIR filter bank from `[b, a]` of shape `(2, n)` or `(n_filters, 2, n)`.
    pub fn iir<D: Dimension>(ba: Array<f64, D>) -> SignalResult<Self> {
        Self::new(FilterKind::Iir, Some(ba.into_dyn()), None)
    }

    /// SOS filter bank of shape `(n_sections, 6)` or `(n_filters, n_sections, 6)`.
    pub fn sos<D: Dimension>(sos: Array<f64, D>) -> SignalResult<Self> {
        Self::new(FilterKind::Sos, Some(sos.into_dyn()), None)
    }

    /// Attaches a comment, see [`normalize_comment`].
    pub fn with_comment(mut self, comment: impl Display) -> Self {
        self.set_comment(comment);
        self
    }

    /// How the coefficient rows are read.
    pub const fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Coefficients in the canonical `(n_filters, n_rows, n_coeffs)` layout.
    pub const fn coefficients(&self) -> Option<&Array3<f64>> {
        self.coefficients.as_ref()
    }

    /// Number of filters in the bank, zero for an empty shell.
    pub fn n_filters(&self) -> usize {
        self.coefficients.as_ref().map_or(0, |c| c.len_of(Axis(0)))
    }

    /// Persisted recursion state, `None` until the first stateful call.
    pub const fn state(&self) -> Option<&ArrayD<f64>> {
        self.state.as_ref()
    }

    /// Free text attached to the filter.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Replaces the comment with the textual form of `comment`.
    pub fn set_comment(&mut self, comment: impl Display) {
        self.comment = Some(normalize_comment(comment));
    }

    /// Sets the state back to rest without changing its shape.
    pub fn reset_state(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.fill(0.0);
        }
    }

    /// Filters `signal` and keeps the recursion state for the next call.
    ///
    /// A zero state is created on the first call and only kept if that call
    /// succeeds. The input signal is not modified; the result is a new time
    /// domain signal.
    ///
    /// # Errors
    /// - [`SignalError::FilterNotInitialized`] for a filter without coefficients
    /// - [`SignalError::DimensionMismatch`] if the state does not fit the signal
    /// - [`SignalError::InvalidParameter`] if a leading denominator coefficient is zero
    pub fn process(&mut self, signal: &Signal) -> SignalResult<Signal> {
        let coefficients = self.initialized()?;
        let expected = state_shape(self.kind, coefficients, signal.n_channels());
        match self.state.take() {
            Some(mut state) => {
                let result = self.evaluate(signal, &mut state);
                self.state = Some(state);
                result
            }
            None => {
                trace!(shape = ?expected, "creating zero filter state");
                let mut state = ArrayD::zeros(IxDyn(&expected));
                let filtered = self.evaluate(signal, &mut state)?;
                self.state = Some(state);
                Ok(filtered)
            }
        }
    }

    /// Filters `signal` starting from rest, leaving the stored state untouched.
    pub fn process_stateless(&self, signal: &Signal) -> SignalResult<Signal> {
        let coefficients = self.initialized()?;
        let expected = state_shape(self.kind, coefficients, signal.n_channels());
        let mut state = ArrayD::zeros(IxDyn(&expected));
        self.evaluate(signal, &mut state)
    }

    fn initialized(&self) -> SignalResult<&Array3<f64>> {
        self.coefficients.as_ref().ok_or_else(|| {
            SignalError::FilterNotInitialized(format!("{} filter has no coefficients", self.kind))
        })
    }

    /// Per filter list of the stages evaluated in cascade.
    fn stages(&self, coefficients: &Array3<f64>) -> SignalResult<Vec<Vec<Stage>>> {
        let mut stages = Vec::with_capacity(coefficients.len_of(Axis(0)));
        for (f, rows) in coefficients.outer_iter().enumerate() {
            let filter_stages = match self.kind {
                FilterKind::Fir | FilterKind::Iir => {
                    vec![Stage::new(rows.row(0), rows.row(1), &format!("filter {f}"))?]
                }
                FilterKind::Sos => rows
                    .outer_iter()
                    .enumerate()
                    .map(|(section, row)| {
                        Stage::new(
                            row.slice(s![..3]),
                            row.slice(s![3..]),
                            &format!("filter {f}, section {section}"),
                        )
                    })
                    .collect::<SignalResult<Vec<_>>>()?,
            };
            stages.push(filter_stages);
        }
        Ok(stages)
    }

    fn evaluate(&self, signal: &Signal, state: &mut ArrayD<f64>) -> SignalResult<Signal> {
        let coefficients = self.initialized()?;
        let n_channels = signal.n_channels();
        let n_samples = signal.n_samples();
        let expected = state_shape(self.kind, coefficients, n_channels);
        if state.shape() != expected.as_slice() {
            return Err(SignalError::dimension_mismatch(
                "filter state",
                &expected,
                state.shape(),
            ));
        }
        let stages = self.stages(coefficients)?;
        let n_filters = stages.len();
        debug!(
            kind = %self.kind,
            n_filters,
            n_channels,
            n_samples,
            "filtering signal"
        );

        let time = signal.time_view()?;
        let channels = time.to_shape((n_channels, n_samples))?;
        let mut output = Array3::<f64>::zeros((n_filters, n_channels, n_samples));
        let mut memory = stage_memory(self.kind, state)?;

        for (f, filter_stages) in stages.iter().enumerate() {
            for (c, input) in channels.outer_iter().enumerate() {
                output.slice_mut(s![f, c, ..]).assign(&input);
                for (stage_index, stage) in filter_stages.iter().enumerate() {
                    stage.run(
                        output.slice_mut(s![f, c, ..]),
                        memory.slice_mut(s![f, stage_index, c, ..]),
                    );
                }
            }
        }

        let mut shape = Vec::with_capacity(signal.cshape().len() + 2);
        if n_filters > 1 {
            shape.push(n_filters);
        }
        shape.extend_from_slice(signal.cshape());
        shape.push(n_samples);
        let output = output.into_shape_with_order(shape)?;
        Signal::new(output, signal.sampling_rate(), signal.signal_type())
    }
}

/// Rank 3 coefficients for `kind`, checked for the row layout of that kind.
fn normalize_coefficients(kind: FilterKind, coefficients: ArrayD<f64>) -> SignalResult<Array3<f64>> {
    let normalized = match (kind, coefficients.ndim()) {
        (FilterKind::Fir, 1 | 2) => {
            let numerators: Array2<f64> = if coefficients.ndim() == 1 {
                coefficients.insert_axis(Axis(0)).into_dimensionality()?
            } else {
                coefficients.into_dimensionality()?
            };
            let (n_filters, n_coeffs) = numerators.dim();
            let mut canonical = Array3::<f64>::zeros((n_filters, 2, n_coeffs));
            canonical.slice_mut(s![.., 0, ..]).assign(&numerators);
            if n_coeffs > 0 {
                canonical.slice_mut(s![.., 1, 0]).fill(1.0);
            }
            canonical
        }
        _ => atleast_3d_first_dim(coefficients)?,
    };

    let (_, n_rows, n_coeffs) = normalized.dim();
    if n_coeffs == 0 {
        return Err(SignalError::shape(format!("{kind} filter needs at least one coefficient")));
    }
    match kind {
        FilterKind::Fir | FilterKind::Iir if n_rows != 2 => Err(SignalError::shape(format!(
            "{kind} coefficients need two rows [b, a], got {n_rows}"
        ))),
        FilterKind::Sos if n_coeffs != 6 => Err(SignalError::shape(format!(
            "SOS sections need 6 coefficients, got {n_coeffs}"
        ))),
        _ => Ok(normalized),
    }
}

const fn state_rank(kind: FilterKind) -> usize {
    match kind {
        FilterKind::Fir | FilterKind::Iir => 3,
        FilterKind::Sos => 4,
    }
}

fn state_shape(kind: FilterKind, coefficients: &Array3<f64>, n_channels: usize) -> Vec<usize> {
    let (n_filters, n_rows, n_coeffs) = coefficients.dim();
    match kind {
        FilterKind::Fir | FilterKind::Iir => vec![n_filters, n_channels, n_coeffs - 1],
        FilterKind::Sos => vec![n_filters, n_rows, n_channels, 2],
    }
}

/// Views any state as `(n_filters, n_stages, n_channels, order)`.
fn stage_memory(kind: FilterKind, state: &mut ArrayD<f64>) -> SignalResult<ArrayViewMut4<'_, f64>> {
    Ok(match kind {
        FilterKind::Fir | FilterKind::Iir => state
            .view_mut()
            .into_dimensionality::<Ix3>()?
            .insert_axis(Axis(1)),
        FilterKind::Sos => state.view_mut().into_dimensionality::<Ix4>()?,
    })
}
