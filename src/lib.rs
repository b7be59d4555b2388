// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # AcousticSignals
//!
//! Multi-channel signal containers for acoustics with lazy conversion between
//! the time and the frequency domain, plus a filter bank engine evaluating
//! FIR, IIR and second order section filters on those signals.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! acoustic_signals = "0.1.0"
//! ```
//!
//! ## Features
//!
//! - `dsp` (default): phase, group delay, zero padding and regularized
//!   spectrum inversion in [`operations::dsp`]
//!
//! ## Data model
//!
//! Every container stores an array whose last axis holds the samples (or
//! frequency bins). All leading axes form the channel shape `cshape`:
//!
//! | container         | domain            | accessors                         |
//! |-------------------|-------------------|-----------------------------------|
//! | [`TimeData`]      | time only         | `time`, `times`                   |
//! | [`FrequencyData`] | frequency only    | `freq`, `frequencies`, `n_bins`   |
//! | [`Signal`]        | both, cached      | all of the above                  |
//!
//! Domain agnostic operations (`reshape`, `flatten`, shape queries) live in
//! the [`SampleData`] trait.
//!
//! ## Error Handling
//!
//! ```rust
//! use acoustic_signals::{SignalError, SignalResult, Signal, SignalType};
//! use ndarray::array;
//!
//! let result: SignalResult<Signal> = Signal::new(array![1.0, 0.0], 0.0, SignalType::Energy);
//! match result {
//!     Err(SignalError::InvalidParameter(msg)) => assert!(msg.contains("sampling_rate")),
//!     other => panic!("unexpected result {other:?}"),
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use acoustic_signals::{Domain, Filter, SampleData, Signal, SignalType};
//! use ndarray::array;
//!
//! let data = array![[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]];
//! let mut signal = Signal::new(data, 48000.0, SignalType::Energy).unwrap();
//! assert_eq!(signal.cshape(), &[2]);
//!
//! // Frequency data is derived on demand.
//! assert_eq!(signal.freq().unwrap().shape(), &[2, 3]);
//!
//! // Two filters applied to two channels give a (2, 2) channel shape.
//! let mut bank = Filter::fir(array![[1.0, 0.5], [1.0, -0.5]]).unwrap();
//! let filtered = bank.process(&signal).unwrap();
//! assert_eq!(filtered.cshape(), &[2, 2]);
//! assert_eq!(filtered.domain(), Domain::Time);
//! ```
//!
//! ## Logging
//!
//! Domain conversions and filter evaluation emit `tracing` events at the
//! `debug` and `trace` levels. The library never installs a subscriber.
//!
//! ## License
//!
//! MIT License

mod error;
pub mod operations;
mod repr;
pub mod signal;
pub mod utils;
pub mod views;

pub use crate::error::{SignalError, SignalResult};
pub use crate::operations::{Filter, FilterKind, atleast_3d_first_dim};
pub use crate::repr::{Domain, SampleBuffer, SignalType};
pub use crate::signal::{DomainCache, Signal};
pub use crate::views::{FrequencyData, SampleData, TimeData};
