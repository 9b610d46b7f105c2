//! Runs a complete experiment: synthesise a reference, bury it in noise,
//! filter it and analyse the spectra of all three signals.
//!
//! The harness only composes the other modules.  It never retries and the
//! first error of any stage is returned unchanged.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::fft::{spectrum, Spectrum};
use crate::filter::alpha::exponential_smooth;
use crate::filter::design::{design_low_pass, FilterFamily};
use crate::filter::iir::apply_cascade;
use crate::filter::kalman::{kalman_filter, KalmanParams};
use crate::signal::noise::add_noise;
use crate::signal::{Signal, Waveform, WaveformKind};
use crate::util::math;

/// The filter an experiment runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FilterChoice {
    Exponential {
        alpha: f64,
    },
    LowPass {
        family: FilterFamily,
        order: usize,
        cutoff: f64,
    },
    Kalman(KalmanParams),
}

impl FilterChoice {
    /// Exponential smoothing with `alpha = 0.05`.
    pub fn exponential() -> FilterChoice {
        FilterChoice::Exponential { alpha: 0.05 }
    }

    /// Fourth order Butterworth low pass at 1500 Hz.
    pub fn butterworth() -> FilterChoice {
        FilterChoice::LowPass {
            family: FilterFamily::Butterworth,
            order: 4,
            cutoff: 1500.0,
        }
    }

    /// Fourth order Chebyshev Type I low pass at 1500 Hz with 1 dB ripple.
    pub fn chebyshev() -> FilterChoice {
        FilterChoice::LowPass {
            family: FilterFamily::Chebyshev1 { ripple_db: 1.0 },
            order: 4,
            cutoff: 1500.0,
        }
    }

    /// Kalman estimator tuned for `kind`.  The sine wave changes smoothly
    /// and gets a smaller process noise and measurement noise.
    pub fn kalman(kind: WaveformKind) -> FilterChoice {
        match kind {
            WaveformKind::Square => FilterChoice::Kalman(KalmanParams::new(1e-4, 0.1)),
            WaveformKind::Sine => FilterChoice::Kalman(KalmanParams::new(1e-5, 0.01)),
        }
    }

    /// The four standard choices for `kind`.
    pub fn all(kind: WaveformKind) -> Vec<FilterChoice> {
        vec![
            FilterChoice::exponential(),
            FilterChoice::butterworth(),
            FilterChoice::chebyshev(),
            FilterChoice::kalman(kind),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterChoice::Exponential { .. } => "exponential",
            FilterChoice::LowPass {
                family: FilterFamily::Butterworth,
                ..
            } => "butterworth",
            FilterChoice::LowPass {
                family: FilterFamily::Chebyshev1 { .. },
                ..
            } => "chebyshev1",
            FilterChoice::Kalman(_) => "kalman",
        }
    }

    /// Runs this filter over `signal`.
    pub fn apply(&self, signal: &Signal) -> Result<Signal> {
        match *self {
            FilterChoice::Exponential { alpha } => exponential_smooth(signal, alpha),
            FilterChoice::LowPass {
                family,
                order,
                cutoff,
            } => {
                let cascade = design_low_pass(family, order, cutoff, signal.sample_rate())?;
                apply_cascade(&cascade, signal)
            }
            FilterChoice::Kalman(params) => kalman_filter(signal, params),
        }
    }
}

/// Everything describing one experiment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub waveform: Waveform,
    #[serde(default = "default_snr_db")]
    pub snr_db: f64,
    #[serde(default = "default_transform_size")]
    pub transform_size: usize,
    pub filter: FilterChoice,
}

fn default_snr_db() -> f64 {
    -3.0
}

fn default_transform_size() -> usize {
    1024
}

impl HarnessConfig {
    /// The default experiment for `kind` with the given filter.
    pub fn new(kind: WaveformKind, filter: FilterChoice) -> HarnessConfig {
        HarnessConfig {
            waveform: Waveform::new(kind),
            snr_db: default_snr_db(),
            transform_size: default_transform_size(),
            filter,
        }
    }

    /// Reads a configuration from JSON.  Missing fields other than
    /// `filter` take the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use denoise_rs::harness::{FilterChoice, HarnessConfig};
    ///
    /// let config = HarnessConfig::from_json(
    ///     r#"{ "snr_db": 0.0, "filter": { "method": "exponential", "alpha": 0.1 } }"#,
    /// ).unwrap();
    /// assert_eq!(config.filter, FilterChoice::Exponential { alpha: 0.1 });
    /// assert_eq!(config.transform_size, 1024);
    /// ```
    pub fn from_json(text: &str) -> Result<HarnessConfig> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A time domain signal with its spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct Analyzed {
    pub signal: Signal,
    pub spectrum: Spectrum,
}

impl Analyzed {
    fn new(signal: Signal, transform_size: usize) -> Result<Analyzed> {
        let spectrum = spectrum(&signal, transform_size)?;
        Ok(Analyzed { signal, spectrum })
    }
}

/// Outcome of one experiment.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub filter: FilterChoice,
    pub clean: Analyzed,
    pub noisy: Analyzed,
    pub filtered: Analyzed,
}

impl Evaluation {
    /// RMS distance between the noisy signal and the clean reference.
    pub fn noisy_rms_error(&self) -> Result<f64> {
        math::rms_error(self.noisy.signal.samples(), self.clean.signal.samples())
    }

    /// RMS distance between the filtered signal and the clean reference.
    pub fn filtered_rms_error(&self) -> Result<f64> {
        math::rms_error(self.filtered.signal.samples(), self.clean.signal.samples())
    }

    /// SNR actually present in the noisy signal, in dB.
    pub fn achieved_snr_db(&self) -> f64 {
        let noise: Vec<f64> = self
            .noisy
            .signal
            .samples()
            .iter()
            .zip(self.clean.signal.samples())
            .map(|(n, c)| n - c)
            .collect();
        math::snr_db(self.clean.signal.power(), math::mean_square(&noise))
    }
}

/// Filters an already noised signal and analyses all three signals.
fn analyse(
    filter: FilterChoice,
    clean: &Signal,
    noisy: &Signal,
    transform_size: usize,
) -> Result<Evaluation> {
    clean.ensure_comparable(noisy)?;
    let filtered = filter.apply(noisy)?;
    log::debug!(
        "{} filter run over {} samples",
        filter.name(),
        filtered.len()
    );
    Ok(Evaluation {
        filter,
        clean: Analyzed::new(clean.clone(), transform_size)?,
        noisy: Analyzed::new(noisy.clone(), transform_size)?,
        filtered: Analyzed::new(filtered, transform_size)?,
    })
}

/// Runs one experiment, drawing noise from `rng`.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use denoise_rs::harness::{evaluate, FilterChoice, HarnessConfig};
/// use denoise_rs::signal::WaveformKind;
///
/// let config = HarnessConfig::new(WaveformKind::Sine, FilterChoice::butterworth());
/// let result = evaluate(&config, &mut StdRng::seed_from_u64(1)).unwrap();
/// assert_eq!(result.filtered.signal.len(), 500);
/// assert_eq!(result.filtered.spectrum.len(), 512);
/// ```
pub fn evaluate<R>(config: &HarnessConfig, rng: &mut R) -> Result<Evaluation>
where
    R: Rng + ?Sized,
{
    let clean = config.waveform.synthesize()?;
    let noisy = add_noise(&clean, config.snr_db, rng)?;
    analyse(config.filter, &clean, &noisy, config.transform_size)
}

/// Runs several filters over the same noisy signal.
///
/// The reference and the noise are generated once from `seed`; each filter
/// then runs independently with its own state, in parallel.  Results come
/// back in the order of `filters`.
pub fn compare_filters(
    waveform: &Waveform,
    snr_db: f64,
    transform_size: usize,
    filters: &[FilterChoice],
    seed: u64,
) -> Result<Vec<Evaluation>> {
    if filters.is_empty() {
        return invalid("no filters to compare");
    }
    let clean = waveform.synthesize()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let noisy = add_noise(&clean, snr_db, &mut rng)?;
    filters
        .par_iter()
        .map(|&filter| analyse(filter, &clean, &noisy, transform_size))
        .collect()
}
