//! Recovering a periodic reference signal from additive Gaussian noise.
//!
//! A clean square or sine wave is synthesised, buried in noise at a chosen
//! signal-to-noise ratio and passed through one of four estimators:
//! exponential smoothing, a Butterworth or Chebyshev Type I low pass IIR
//! filter, or a scalar Kalman estimator.  The clean, noisy and filtered
//! signals are then compared in the time domain and through fixed size
//! magnitude spectra.
//!
//! # Example
//!
//! ```
//! use denoise_rs::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let clean = synthesize(WaveformKind::Square, 100_000.0, 0.005, 1000.0, 1.0).unwrap();
//! let noisy = add_noise(&clean, -3.0, &mut StdRng::seed_from_u64(0)).unwrap();
//!
//! let cascade = design_low_pass(FilterFamily::Butterworth, 4, 1500.0, 100_000.0).unwrap();
//! let filtered = apply_cascade(&cascade, &noisy).unwrap();
//!
//! let spec = spectrum(&filtered, 1024).unwrap();
//! assert_eq!(filtered.len(), clean.len());
//! assert_eq!(spec.len(), 512);
//! ```

pub mod error;
pub mod fft;
pub mod filter;
pub mod harness;
pub mod prelude;
pub mod signal;
pub mod util;

pub use error::{FilterError, Result};
