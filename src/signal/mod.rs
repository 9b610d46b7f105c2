//! Reference waveforms and the buffered `Signal` type every filter consumes.
//!
//! A `Signal` is a finite, fully materialised run of real samples taken at a
//! uniform sampling rate. Once built it is never mutated: filters and the
//! noise injector always hand back a new `Signal` of the same length and
//! rate.

pub mod noise;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::util::math;

/// An immutable buffer of real samples with its sampling rate in Hz.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Creates a new `Signal`.
    ///
    /// The sampling rate must be positive and finite and every sample must be
    /// finite. An empty buffer is allowed here; the filters reject it.
    ///
    /// # Examples
    ///
    /// ```
    /// use denoise_rs::signal::Signal;
    ///
    /// let signal = Signal::new(vec![0.0, 1.0, 0.0, -1.0], 4.0).unwrap();
    /// assert_eq!(signal.len(), 4);
    /// assert!(Signal::new(vec![f64::NAN], 4.0).is_err());
    /// ```
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Signal> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return invalid(format!(
                "sampling rate must be positive and finite, got {}",
                sample_rate
            ));
        }
        if !math::all_finite(&samples) {
            return invalid("signal contains non-finite samples");
        }
        Ok(Signal {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the buffer in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Sample instants `t[i] = i / fs` in seconds.
    pub fn times(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| i as f64 / self.sample_rate)
            .collect()
    }

    /// Mean-square power of the samples.
    pub fn power(&self) -> f64 {
        math::mean_square(&self.samples)
    }

    /// True when both signals were sampled at the same rate.
    pub fn same_rate(&self, other: &Signal) -> bool {
        self.sample_rate == other.sample_rate
    }

    /// Fails unless `other` has the same rate and length as `self`.
    pub fn ensure_comparable(&self, other: &Signal) -> Result<()> {
        if !self.same_rate(other) {
            return invalid(format!(
                "sampling rates differ: {} Hz vs {} Hz",
                self.sample_rate, other.sample_rate
            ));
        }
        if self.len() != other.len() {
            return invalid(format!(
                "signal lengths differ: {} vs {}",
                self.len(),
                other.len()
            ));
        }
        Ok(())
    }

    /// Builds a signal of the same rate from already validated samples.
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Signal {
        Signal {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Shape of the periodic reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveformKind {
    Square,
    Sine,
}

/// Everything needed to synthesise a clean reference signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waveform {
    pub kind: WaveformKind,
    pub sample_rate: f64,
    pub duration: f64,
    pub frequency: f64,
    pub amplitude: f64,
}

impl Waveform {
    /// The 1 kHz, 5 ms reference sampled at 100 kHz.
    pub fn new(kind: WaveformKind) -> Waveform {
        Waveform {
            kind,
            sample_rate: 100_000.0,
            duration: 0.005,
            frequency: 1000.0,
            amplitude: 1.0,
        }
    }

    pub fn synthesize(&self) -> Result<Signal> {
        synthesize(
            self.kind,
            self.sample_rate,
            self.duration,
            self.frequency,
            self.amplitude,
        )
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::new(WaveformKind::Square)
    }
}

/// Synthesises a clean square or sine wave.
///
/// The buffer holds `floor(sample_rate * duration)` samples at
/// `t[i] = i / sample_rate`. The square wave is `+amplitude` over the first
/// half of each period and `-amplitude` over the second half.
///
/// # Arguments
///
/// * `kind` - Square or sine.
/// * `sample_rate` - Sampling rate in Hz.
/// * `duration` - Length of the buffer in seconds.
/// * `frequency` - Frequency of the waveform in Hz.
/// * `amplitude` - Peak amplitude.
///
/// # Examples
///
/// ```
/// use denoise_rs::signal::{synthesize, WaveformKind};
///
/// let square = synthesize(WaveformKind::Square, 100_000.0, 0.005, 1000.0, 1.0).unwrap();
/// assert_eq!(square.len(), 500);
/// assert_eq!(square.samples()[0], 1.0);
/// assert_eq!(square.samples()[50], -1.0);
/// ```
pub fn synthesize(
    kind: WaveformKind,
    sample_rate: f64,
    duration: f64,
    frequency: f64,
    amplitude: f64,
) -> Result<Signal> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return invalid(format!("sampling rate must be positive, got {}", sample_rate));
    }
    if !(duration.is_finite() && duration > 0.0) {
        return invalid(format!("duration must be positive, got {}", duration));
    }
    if !(frequency.is_finite() && frequency > 0.0) {
        return invalid(format!("signal frequency must be positive, got {}", frequency));
    }
    if !amplitude.is_finite() {
        return invalid("amplitude must be finite");
    }
    // Round away representation error before truncating, 100000 * 0.005
    // must give 500 samples and not 499.
    let n = (sample_rate * duration * (1.0 + 1e-12)).floor() as usize;
    if n == 0 {
        return invalid("duration is shorter than one sampling period");
    }

    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate;
            match kind {
                WaveformKind::Sine => amplitude * (2.0 * PI * frequency * t).sin(),
                WaveformKind::Square => {
                    let phase = (i as f64 * frequency / sample_rate).fract();
                    if phase < 0.5 {
                        amplitude
                    } else {
                        -amplitude
                    }
                }
            }
        })
        .collect();
    log::debug!(
        "synthesized {:?} wave: {} samples at {} Hz, f = {} Hz",
        kind,
        n,
        sample_rate,
        frequency
    );
    Signal::new(samples, sample_rate)
}

#[cfg(test)]
mod test {
    use crate::signal::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_square_wave_shape() {
        let sig = synthesize(WaveformKind::Square, 100_000.0, 0.005, 1000.0, 2.0).unwrap();
        assert_eq!(sig.len(), 500);
        // 100 samples per period, 50 high then 50 low.
        assert!(sig.samples()[..50].iter().all(|&x| x == 2.0));
        assert!(sig.samples()[50..100].iter().all(|&x| x == -2.0));
        assert!(sig.samples()[100..150].iter().all(|&x| x == 2.0));
        assert_approx_eq!(sig.power(), 4.0);
    }

    #[test]
    fn test_sine_wave_shape() {
        let sig = synthesize(WaveformKind::Sine, 8000.0, 0.01, 100.0, 1.0).unwrap();
        assert_eq!(sig.len(), 80);
        assert_approx_eq!(sig.samples()[0], 0.0);
        assert_approx_eq!(sig.samples()[20], 1.0);
        assert_approx_eq!(sig.samples()[60], -1.0);
        assert_approx_eq!(sig.power(), 0.5);
    }

    #[test]
    fn test_times_and_duration() {
        let sig = Signal::new(vec![0.0; 4], 2.0).unwrap();
        assert_eq!(sig.times(), vec![0.0, 0.5, 1.0, 1.5]);
        assert_approx_eq!(sig.duration(), 2.0);
    }

    #[test]
    fn test_invalid_synthesis_parameters() {
        assert!(synthesize(WaveformKind::Sine, 0.0, 1.0, 1.0, 1.0).is_err());
        assert!(synthesize(WaveformKind::Sine, 100.0, 0.0, 1.0, 1.0).is_err());
        assert!(synthesize(WaveformKind::Sine, 100.0, 1.0, -1.0, 1.0).is_err());
        assert!(synthesize(WaveformKind::Sine, 100.0, 0.001, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_comparable() {
        let a = Signal::new(vec![0.0; 4], 2.0).unwrap();
        let b = Signal::new(vec![0.0; 4], 4.0).unwrap();
        let c = Signal::new(vec![0.0; 3], 2.0).unwrap();
        assert!(a.ensure_comparable(&a.clone()).is_ok());
        assert!(a.ensure_comparable(&b).is_err());
        assert!(a.ensure_comparable(&c).is_err());
    }
}
