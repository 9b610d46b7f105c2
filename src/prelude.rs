//! This module provides an easy single import for those using this crate.

pub use crate::error::{FilterError, Result};
pub use crate::fft::{magnitude_spectrum, spectrum, Spectrum};
pub use crate::filter::alpha::exponential_smooth;
pub use crate::filter::design::{design_low_pass, FilterFamily};
pub use crate::filter::iir::{apply_cascade, Biquad, FilterCascade};
pub use crate::filter::kalman::{kalman_filter, kalman_trace, KalmanParams, ScalarKalman};
pub use crate::harness::{compare_filters, evaluate, Evaluation, FilterChoice, HarnessConfig};
pub use crate::signal::noise::{add_noise, NoiseSpec};
pub use crate::signal::{synthesize, Signal, Waveform, WaveformKind};
