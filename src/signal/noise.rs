//! Additive white Gaussian noise at a requested signal-to-noise ratio.
//!
//! The noise power is derived from the measured power of the clean signal,
//! `noise_power = signal_power / 10^(snr_db / 10)`, and one zero-mean
//! Gaussian value is drawn per sample. The random source is always supplied
//! by the caller so runs can be reproduced with a seeded generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::signal::Signal;
use crate::util::math;

/// Target signal-to-noise ratio for additive noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub snr_db: f64,
}

impl NoiseSpec {
    pub fn new(snr_db: f64) -> Result<NoiseSpec> {
        if !snr_db.is_finite() {
            return invalid(format!("SNR must be finite, got {}", snr_db));
        }
        Ok(NoiseSpec { snr_db })
    }

    /// Noise power giving this SNR against a signal of `signal_power`.
    pub fn noise_power(&self, signal_power: f64) -> f64 {
        signal_power / math::db_to_power_ratio(self.snr_db)
    }

    /// Standard deviation of the Gaussian noise for `signal_power`.
    pub fn noise_std_dev(&self, signal_power: f64) -> f64 {
        self.noise_power(signal_power).sqrt()
    }
}

impl Default for NoiseSpec {
    fn default() -> Self {
        NoiseSpec { snr_db: -3.0 }
    }
}

/// Returns a copy of `signal` with Gaussian noise added at `snr_db`.
///
/// # Arguments
///
/// * `signal` - Clean signal, its mean-square power sets the noise level.
/// * `snr_db` - Target signal-to-noise ratio in decibels.
/// * `rng` - Random source the noise is drawn from.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use denoise_rs::signal::{synthesize, WaveformKind};
/// use denoise_rs::signal::noise::add_noise;
///
/// let clean = synthesize(WaveformKind::Sine, 100_000.0, 0.005, 1000.0, 1.0).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
/// let noisy = add_noise(&clean, -3.0, &mut rng).unwrap();
/// assert_eq!(noisy.len(), clean.len());
/// ```
pub fn add_noise<R>(signal: &Signal, snr_db: f64, rng: &mut R) -> Result<Signal>
where
    R: Rng + ?Sized,
{
    let spec = NoiseSpec::new(snr_db)?;
    if signal.is_empty() {
        return invalid("cannot add noise to an empty signal");
    }
    let signal_power = signal.power();
    let std_dev = spec.noise_std_dev(signal_power);
    let dist = match Normal::new(0.0, std_dev) {
        Ok(dist) => dist,
        Err(e) => {
            return invalid(format!(
                "noise standard deviation {} is unusable: {}",
                std_dev, e
            ))
        }
    };
    log::debug!(
        "adding noise at {} dB: signal power {}, noise power {}",
        snr_db,
        signal_power,
        std_dev * std_dev
    );

    let noisy: Vec<f64> = signal
        .samples()
        .iter()
        .map(|x| x + dist.sample(&mut *rng))
        .collect();
    Signal::new(noisy, signal.sample_rate())
}

/// Same as `add_noise`, drawing from a freshly seeded entropy source.
///
/// Each call uses a new generator, so consecutive calls are independent.
pub fn add_noise_from_entropy(signal: &Signal, snr_db: f64) -> Result<Signal> {
    let mut rng = StdRng::from_entropy();
    add_noise(signal, snr_db, &mut rng)
}
