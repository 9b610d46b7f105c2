//! Exponential smoothing, also known as the alpha filter.
//!
//! `y[0] = z[0]` and `y[k] = alpha * z[k] + (1 - alpha) * y[k - 1]`.  Smaller
//! values of `alpha` remove more high frequency content but add more lag, the
//! group delay is roughly `(1 - alpha) / alpha` samples.

use crate::error::{invalid, Result};
use crate::filter::finish;
use crate::signal::Signal;

/// Running state of one smoothing pass.
#[derive(Clone, Copy, Debug)]
struct SmootherState {
    prev: f64,
}

impl SmootherState {
    fn push(&mut self, alpha: f64, input: f64) -> f64 {
        self.prev = alpha * input + (1.0 - alpha) * self.prev;
        self.prev
    }
}

/// Smooths `signal` with factor `alpha`.
///
/// # Arguments
///
/// * `signal` - Noisy input, must not be empty.
/// * `alpha` - Smoothing factor on the interval (0, 1].  `alpha = 1` returns
///   the input unchanged.
///
/// # Examples
///
/// ```
/// use denoise_rs::filter::alpha::exponential_smooth;
/// use denoise_rs::signal::Signal;
///
/// let input = Signal::new(vec![0.0, 1.0, 1.0, 1.0], 4.0).unwrap();
/// let output = exponential_smooth(&input, 0.5).unwrap();
/// assert_eq!(output.samples(), &[0.0, 0.5, 0.75, 0.875]);
/// ```
pub fn exponential_smooth(signal: &Signal, alpha: f64) -> Result<Signal> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return invalid(format!("alpha must be in (0, 1], got {}", alpha));
    }
    let input = signal.samples();
    let first = match input.first() {
        Some(&x) => x,
        None => return invalid("cannot smooth an empty signal"),
    };
    if alpha == 1.0 {
        return Ok(signal.clone());
    }

    let mut state = SmootherState { prev: first };
    let mut output = Vec::with_capacity(input.len());
    output.push(first);
    for &z in &input[1..] {
        output.push(state.push(alpha, z));
    }
    log::trace!("smoothed {} samples with alpha = {}", output.len(), alpha);
    finish(signal, output, "exponential smoothing")
}
