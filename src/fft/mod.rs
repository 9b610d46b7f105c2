//! Fixed size magnitude spectra for comparing clean, noisy and filtered
//! signals.
//!
//! Every signal is truncated or zero padded to the same transform size and
//! no window is applied, so spectra computed with the same size and rate
//! share one frequency grid and the same leakage.

use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{invalid, unstable, Result};
use crate::signal::Signal;
use crate::util::math;

/// Batch based wrapper of the FFT implementation provided by
/// [RustFFT](https://github.com/ejmahler/RustFFT).
///
/// Acts on one whole buffer of real samples at a time.  Shorter buffers are
/// zero padded and longer ones truncated to `fft_size`.
pub struct BatchFFT {
    pub fft: Arc<dyn Fft<f64>>,
    pub fft_size: usize,
}

impl BatchFFT {
    /// Creates a new forward `BatchFFT` of `fft_size` points.
    ///
    /// # Examples
    ///
    /// ```
    /// use denoise_rs::fft::BatchFFT;
    ///
    /// let batch_fft = BatchFFT::new(1024).unwrap();
    /// assert!(BatchFFT::new(1000).is_err());
    /// ```
    pub fn new(fft_size: usize) -> Result<BatchFFT> {
        if !math::is_power_of_two(fft_size) {
            return invalid(format!(
                "transform size must be a positive power of two, got {}",
                fft_size
            ));
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        Ok(BatchFFT { fft, fft_size })
    }

    /// Runs the `BatchFFT` over real samples and returns all `fft_size`
    /// complex bins.
    pub fn run_fft(&self, data: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = data
            .iter()
            .take(self.fft_size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::zero());
        self.fft.process(&mut buffer);
        buffer
    }

    /// Magnitudes of the non-negative frequency half, bins `0..fft_size/2`.
    pub fn magnitudes(&self, data: &[f64]) -> Vec<f64> {
        self.run_fft(data)
            .iter()
            .take(self.fft_size / 2)
            .map(|x| x.norm())
            .collect()
    }
}

/// Non-negative frequency half of a magnitude spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies in Hz, `i * fs / N`, ascending.
    pub frequencies: Vec<f64>,
    /// `|DFT[i]|` for each bin.
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Spacing between two bins in Hz.
    pub fn resolution(&self) -> f64 {
        match self.frequencies.get(1) {
            Some(f) => *f,
            None => 0.0,
        }
    }

    /// Index of the strongest bin.
    pub fn peak_bin(&self) -> Option<usize> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    /// Frequency of the strongest bin in Hz.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.peak_bin().map(|i| self.frequencies[i])
    }

    /// Sum of the squared magnitudes of bins at or above `freq` Hz.
    pub fn energy_above(&self, freq: f64) -> f64 {
        self.frequencies
            .iter()
            .zip(self.magnitudes.iter())
            .filter(|(f, _)| **f >= freq)
            .map(|(_, m)| m * m)
            .sum()
    }
}

/// Computes the magnitude spectrum of raw samples.
///
/// # Arguments
///
/// * `samples` - Samples to analyse, truncated or zero padded to
///   `transform_size`.
/// * `sample_rate` - Sampling rate in Hz, used for the frequency grid.
/// * `transform_size` - Number of DFT points, a power of two.
///
/// # Examples
///
/// ```
/// use denoise_rs::fft::magnitude_spectrum;
///
/// let spectrum = magnitude_spectrum(&[1.0; 8], 8.0, 8).unwrap();
/// assert_eq!(spectrum.frequencies, vec![0.0, 1.0, 2.0, 3.0]);
/// assert!((spectrum.magnitudes[0] - 8.0).abs() < 1e-12);
/// ```
pub fn magnitude_spectrum(
    samples: &[f64],
    sample_rate: f64,
    transform_size: usize,
) -> Result<Spectrum> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return invalid(format!("sampling rate must be positive, got {}", sample_rate));
    }
    let batch_fft = BatchFFT::new(transform_size)?;
    let magnitudes = batch_fft.magnitudes(samples);
    if !math::all_finite(&magnitudes) {
        return unstable("spectrum contains non-finite magnitudes");
    }
    let frequencies = (0..transform_size / 2)
        .map(|i| i as f64 * sample_rate / transform_size as f64)
        .collect();
    log::trace!(
        "spectrum of {} samples over {} points",
        samples.len(),
        transform_size
    );
    Ok(Spectrum {
        frequencies,
        magnitudes,
    })
}

/// Computes the magnitude spectrum of `signal` at its own sampling rate.
pub fn spectrum(signal: &Signal, transform_size: usize) -> Result<Spectrum> {
    magnitude_spectrum(signal.samples(), signal.sample_rate(), transform_size)
}
