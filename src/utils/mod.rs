//! Utility functions for working with signals.
//!
//! - [`audio_math`] - Level conversion between linear amplitudes and decibels
//! - [`generation`] - Test signal generation

pub mod audio_math;
pub mod generation;

pub use audio_math::{DEFAULT_LOG_PREFIX, DEFAULT_LOG_REFERENCE, amplitude_to_db, db_to_amplitude};
pub use generation::{impulse, sine};
