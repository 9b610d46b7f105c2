//! Filters for recovering a reference signal from additive noise.
//!
//! Three kinds of estimator live here:
//!
//! * Exponential smoothing, a single-pole recursive low pass
//! * Infinite Impulse Response (IIR) low pass filters, Butterworth or
//!   Chebyshev Type I, realised as a cascade of second order sections
//! * A scalar Kalman estimator with a random walk state model
//!
//! All of them are recursive: the output at sample `k` depends on the output
//! at sample `k - 1`. They are therefore processed strictly in order, one
//! sample after the other, and always produce exactly one output sample per
//! input sample.
//!
//! IIR filters are feedback based systems, and have all the caveats associated
//! with any feedback system.  If poorly designed they can be unstable.  The
//! phase and group delay responses are non-linear, so a filtered square wave
//! comes out delayed and with some overshoot near its edges.  Cascading
//! second order sections instead of running one high order difference
//! equation keeps rounding error under control for the orders used here.
//!
//! Every run starts from freshly zeroed state.  Nothing is carried over from
//! one signal to the next, so independent runs may safely be spread over
//! threads.
pub mod alpha;
pub mod design;
pub mod iir;
pub mod kalman;

use crate::error::{unstable, Result};
use crate::signal::Signal;
use crate::util::math;

/// Wraps filter output into a `Signal`, refusing non-finite samples.
pub(crate) fn finish(input: &Signal, output: Vec<f64>, stage: &str) -> Result<Signal> {
    if !math::all_finite(&output) {
        return unstable(format!("{} produced non-finite output", stage));
    }
    Ok(input.with_samples(output))
}
