use num_traits::{Float, NumCast};

use crate::error::{invalid, Result};

/// Mean of the squared samples, the "power" of a buffered signal.
///
/// Returns zero for an empty slice.
///
/// # Examples
///
/// ```
/// use denoise_rs::util::math::mean_square;
///
/// let power = mean_square(&[1.0_f64, -1.0, 1.0, -1.0]);
/// assert_eq!(power, 1.0);
/// ```
pub fn mean_square<T>(samples: &[T]) -> T
where
    T: Float + NumCast,
{
    if samples.is_empty() {
        return T::zero();
    }
    let sum = samples.iter().fold(T::zero(), |acc, &x| acc + x * x);
    sum / T::from(samples.len()).unwrap_or_else(T::one)
}

/// Root of the mean squared difference between two equally long buffers.
///
/// # Arguments
///
/// * `estimate` - Samples under test.
/// * `reference` - Samples `estimate` is compared against.
///
/// # Examples
///
/// ```
/// use denoise_rs::util::math::rms_error;
///
/// let err = rms_error(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]).unwrap();
/// assert!((err - (4.0_f64 / 3.0).sqrt()).abs() < 1e-12);
/// ```
pub fn rms_error(estimate: &[f64], reference: &[f64]) -> Result<f64> {
    if estimate.len() != reference.len() {
        return invalid(format!(
            "cannot compare buffers of length {} and {}",
            estimate.len(),
            reference.len()
        ));
    }
    if estimate.is_empty() {
        return invalid("cannot compare empty buffers");
    }
    let diff: Vec<f64> = estimate
        .iter()
        .zip(reference.iter())
        .map(|(e, r)| e - r)
        .collect();
    Ok(mean_square(&diff).sqrt())
}

/// Converts a ratio in decibels to a linear power ratio.
pub fn db_to_power_ratio(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Signal-to-noise ratio in dB from a signal power and a noise power.
pub fn snr_db(signal_power: f64, noise_power: f64) -> f64 {
    10.0 * (signal_power / noise_power).log10()
}

/// True when `n` is a positive power of two.
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Checks that every sample is finite.
pub fn all_finite(samples: &[f64]) -> bool {
    samples.iter().all(|x| x.is_finite())
}
