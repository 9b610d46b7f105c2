//! Scalar Kalman estimator with a random walk state model.
//!
//! The state is a single value `x` with error covariance `P`.  Each sample
//! goes through a predict step (`x- = x`, `P- = P + Q`) and an update step
//!
//! ```text
//! K = P- / (P- + R)
//! x = x- + K (z - x-)
//! P = (1 - K) P-
//! ```
//!
//! `Q` models how much the underlying value may wander between samples and
//! `R` the variance of the measurement noise.  Both are fixed for a run.

use serde::{Deserialize, Serialize};

use crate::error::{invalid, unstable, Result};
use crate::filter::finish;
use crate::signal::Signal;

/// Noise parameters and starting point of a Kalman run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanParams {
    /// Process noise variance, `Q >= 0`.
    pub q: f64,
    /// Measurement noise variance, `R > 0`.
    pub r: f64,
    pub initial_estimate: f64,
    pub initial_covariance: f64,
}

impl KalmanParams {
    /// Parameters with the usual starting point: estimate 0, covariance 1.
    pub fn new(q: f64, r: f64) -> KalmanParams {
        KalmanParams {
            q,
            r,
            initial_estimate: 0.0,
            initial_covariance: 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.q.is_finite() && self.q >= 0.0) {
            return invalid(format!("process noise Q must be >= 0, got {}", self.q));
        }
        if !(self.r.is_finite() && self.r > 0.0) {
            return invalid(format!("measurement noise R must be > 0, got {}", self.r));
        }
        if !self.initial_estimate.is_finite() {
            return invalid("initial estimate must be finite");
        }
        if !(self.initial_covariance.is_finite() && self.initial_covariance >= 0.0) {
            return invalid(format!(
                "initial covariance must be >= 0, got {}",
                self.initial_covariance
            ));
        }
        Ok(())
    }
}

impl Default for KalmanParams {
    fn default() -> Self {
        KalmanParams::new(1e-4, 0.1)
    }
}

/// Estimate and error covariance between two samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KalmanState {
    pub estimate: f64,
    pub covariance: f64,
}

/// A single scalar Kalman estimator.
///
/// Owns its state, so every run over a signal should use a new instance.
#[derive(Clone, Debug)]
pub struct ScalarKalman {
    params: KalmanParams,
    state: KalmanState,
    gain: f64,
}

impl ScalarKalman {
    /// Creates a new `ScalarKalman` in its initial state.
    ///
    /// # Examples
    ///
    /// ```
    /// use denoise_rs::filter::kalman::{KalmanParams, ScalarKalman};
    ///
    /// let mut kalman = ScalarKalman::new(KalmanParams::new(0.0, 1.0)).unwrap();
    /// kalman.predict();
    /// let estimate = kalman.update(2.0);
    /// assert_eq!(estimate, 1.0);
    /// assert_eq!(kalman.state().covariance, 0.5);
    /// ```
    pub fn new(params: KalmanParams) -> Result<ScalarKalman> {
        params.validate()?;
        Ok(ScalarKalman {
            params,
            state: KalmanState {
                estimate: params.initial_estimate,
                covariance: params.initial_covariance,
            },
            gain: 0.0,
        })
    }

    pub fn state(&self) -> KalmanState {
        self.state
    }

    /// Gain used by the last update, 0 before the first one.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Time update.  The random walk model keeps the estimate and grows the
    /// covariance by `Q`.
    pub fn predict(&mut self) {
        self.state.covariance += self.params.q;
    }

    /// Measurement update with observation `z`, returns the new estimate.
    pub fn update(&mut self, z: f64) -> f64 {
        let prior = self.state;
        self.gain = prior.covariance / (prior.covariance + self.params.r);
        self.state.estimate = prior.estimate + self.gain * (z - prior.estimate);
        self.state.covariance = (1.0 - self.gain) * prior.covariance;
        self.state.estimate
    }
}

/// Full record of a Kalman run.
#[derive(Clone, Debug, PartialEq)]
pub struct KalmanTrace {
    /// Post-update estimates, one per input sample.
    pub estimates: Signal,
    /// Error covariance `P[k]` after each update.
    pub covariances: Vec<f64>,
    /// Kalman gain `K[k]`, 0 at index 0.
    pub gains: Vec<f64>,
}

/// Runs the estimator over `signal` and records the full trace.
///
/// Sample 0 of the output is the initial estimate; the remaining `n - 1`
/// samples each go through one predict/update cycle.
pub fn kalman_trace(signal: &Signal, params: KalmanParams) -> Result<KalmanTrace> {
    let mut kalman = ScalarKalman::new(params)?;
    let input = signal.samples();
    if input.is_empty() {
        return invalid("cannot run a Kalman estimator over an empty signal");
    }

    let mut estimates = Vec::with_capacity(input.len());
    let mut covariances = Vec::with_capacity(input.len());
    let mut gains = Vec::with_capacity(input.len());
    estimates.push(kalman.state().estimate);
    covariances.push(kalman.state().covariance);
    gains.push(kalman.gain());

    for &z in &input[1..] {
        kalman.predict();
        estimates.push(kalman.update(z));
        covariances.push(kalman.state().covariance);
        gains.push(kalman.gain());
    }

    if !covariances.iter().chain(gains.iter()).all(|x| x.is_finite()) {
        return unstable("Kalman covariance diverged");
    }
    log::trace!(
        "Kalman run over {} samples, final P = {}, final K = {}",
        input.len(),
        kalman.state().covariance,
        kalman.gain()
    );
    Ok(KalmanTrace {
        estimates: finish(signal, estimates, "Kalman estimator")?,
        covariances,
        gains,
    })
}

/// Runs the estimator over `signal` and returns the estimates.
///
/// # Arguments
///
/// * `signal` - Noisy observations, must not be empty.
/// * `params` - `Q`, `R` and the starting estimate and covariance.
///
/// # Examples
///
/// ```
/// use denoise_rs::filter::kalman::{kalman_filter, KalmanParams};
/// use denoise_rs::signal::Signal;
///
/// let input = Signal::new(vec![1.0; 200], 1000.0).unwrap();
/// let output = kalman_filter(&input, KalmanParams::new(1e-4, 0.1)).unwrap();
/// assert_eq!(output.len(), 200);
/// assert_eq!(output.samples()[0], 0.0);
/// assert!((output.samples()[199] - 1.0).abs() < 1e-3);
/// ```
pub fn kalman_filter(signal: &Signal, params: KalmanParams) -> Result<Signal> {
    kalman_trace(signal, params).map(|trace| trace.estimates)
}
