//! Signal processing operations.
//!
//! ## Module Organization
//!
//! - [`shape`] - Canonical rank 3 layout of filter coefficients
//! - [`filter_bank`] - FIR, IIR and SOS filter banks
//! - [`transforms`] - One-sided FFT used for domain conversion
//! - [`dsp`] - Phase, group delay, padding and spectrum inversion
//! - [`types`] - Supporting types and enums
//!
//! ## Quick Start
//!
//! ```rust
//! use acoustic_signals::operations::{Filter, PadMode, dsp::pad_zeros};
//! use acoustic_signals::utils::generation::impulse;
//! use ndarray::array;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let signal = impulse(64, 44100.0, &[2], 1.0, 0)?;
//! let mut lowpass = Filter::sos(array![[0.5, 0.5, 0.0, 1.0, 0.0, 0.0]])?;
//! let filtered = lowpass.process(&signal)?;
//! let padded = pad_zeros(&filtered, 64, PadMode::After)?;
//! assert_eq!(padded.n_samples(), 128);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// Public module declarations
pub mod filter_bank;
pub mod shape;
pub mod transforms;
pub mod types;

#[cfg(feature = "dsp")]
pub mod dsp;

pub use filter_bank::{Filter, normalize_comment};
pub use shape::atleast_3d_first_dim;
pub use types::{FilterKind, InversionOptions, PadMode, PhaseUnwrap};
