//! Second order sections and their causal application.
//!
//! A `Biquad` holds the coefficients of
//!
//! ```text
//!         b0 + b1 z^-1 + b2 z^-2
//! H(z) = ------------------------
//!          1 + a1 z^-1 + a2 z^-2
//! ```
//!
//! and a `FilterCascade` runs several of them one after the other.  Each
//! section is realised in transposed direct form II with two delay registers
//! that start at zero for every call to `apply_cascade`.

use num::Complex;
use std::f64::consts::PI;

use crate::error::{invalid, unstable, Result};
use crate::filter::finish;
use crate::signal::Signal;

/// One second order section, `a0` normalised to 1.
///
/// A first order section is stored with `b2 = a2 = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    /// Creates a new `Biquad`, dividing every coefficient by `a[0]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use denoise_rs::filter::iir::Biquad;
    ///
    /// let section = Biquad::new([2.0, 4.0, 2.0], [2.0, -1.0, 0.5]).unwrap();
    /// assert_eq!(section.b, [1.0, 2.0, 1.0]);
    /// assert_eq!(section.a, [1.0, -0.5, 0.25]);
    /// ```
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Result<Biquad> {
        if a[0] == 0.0 {
            return invalid("leading denominator coefficient must be non-zero");
        }
        let norm = a[0];
        let section = Biquad {
            b: [b[0] / norm, b[1] / norm, b[2] / norm],
            a: [1.0, a[1] / norm, a[2] / norm],
        };
        if !section.is_finite() {
            return unstable("second order section has non-finite coefficients");
        }
        Ok(section)
    }

    pub fn is_finite(&self) -> bool {
        self.b.iter().chain(self.a.iter()).all(|c| c.is_finite())
    }

    /// True when both poles lie strictly inside the unit circle.
    ///
    /// Uses the stability triangle `|a2| < 1`, `|a1| < 1 + a2`.
    pub fn is_stable(&self) -> bool {
        let (a1, a2) = (self.a[1], self.a[2]);
        a2.abs() < 1.0 && a1.abs() < 1.0 + a2
    }

    /// Gain of the section at 0 Hz.
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Complex response of the section at normalised angular frequency
    /// `omega` (radians per sample).
    pub fn response(&self, omega: f64) -> Complex<f64> {
        let z1 = Complex::new(0.0, -omega).exp();
        let z2 = z1 * z1;
        let num = z2 * self.b[2] + z1 * self.b[1] + self.b[0];
        let den = z2 * self.a[2] + z1 * self.a[1] + self.a[0];
        num / den
    }
}

/// Delay registers of one section during one run.
#[derive(Clone, Copy, Debug, Default)]
struct SectionState {
    z1: f64,
    z2: f64,
}

impl SectionState {
    fn push(&mut self, s: &Biquad, x: f64) -> f64 {
        let y = s.b[0] * x + self.z1;
        self.z1 = s.b[1] * x - s.a[1] * y + self.z2;
        self.z2 = s.b[2] * x - s.a[2] * y;
        y
    }
}

/// An ordered chain of second order sections.
///
/// The order is fixed when the cascade is designed and is never permuted.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCascade {
    sections: Vec<Biquad>,
}

impl FilterCascade {
    pub fn new(sections: Vec<Biquad>) -> Result<FilterCascade> {
        if sections.is_empty() {
            return invalid("a filter cascade needs at least one section");
        }
        if let Some(i) = sections.iter().position(|s| !s.is_finite()) {
            return unstable(format!("section {} has non-finite coefficients", i));
        }
        Ok(FilterCascade { sections })
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(Biquad::is_stable)
    }

    pub fn dc_gain(&self) -> f64 {
        self.sections.iter().map(Biquad::dc_gain).product()
    }

    /// Magnitude of the cascade response at `freq` Hz for sampling rate
    /// `sample_rate` Hz.
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq / sample_rate;
        self.sections
            .iter()
            .map(|s| s.response(omega))
            .fold(Complex::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }
}

/// Runs `signal` through every section of `cascade`, in cascade order.
///
/// Each section consumes the whole output of the previous one.  The delay
/// registers start at zero, so the same input always gives the same output.
///
/// # Arguments
///
/// * `cascade` - Designed filter.
/// * `signal` - Input signal, must not be empty.
///
/// # Examples
///
/// ```
/// use denoise_rs::filter::iir::{apply_cascade, Biquad, FilterCascade};
/// use denoise_rs::signal::Signal;
///
/// // Two sample moving average.
/// let section = Biquad::new([0.5, 0.5, 0.0], [1.0, 0.0, 0.0]).unwrap();
/// let cascade = FilterCascade::new(vec![section]).unwrap();
/// let input = Signal::new(vec![2.0, 4.0, 6.0], 10.0).unwrap();
/// let output = apply_cascade(&cascade, &input).unwrap();
/// assert_eq!(output.samples(), &[1.0, 3.0, 5.0]);
/// ```
pub fn apply_cascade(cascade: &FilterCascade, signal: &Signal) -> Result<Signal> {
    if signal.is_empty() {
        return invalid("cannot filter an empty signal");
    }
    let mut data = signal.samples().to_vec();
    for section in &cascade.sections {
        let mut state = SectionState::default();
        for sample in data.iter_mut() {
            *sample = state.push(section, *sample);
        }
    }
    log::trace!(
        "applied {} sections to {} samples",
        cascade.sections.len(),
        data.len()
    );
    finish(signal, data, "IIR cascade")
}
