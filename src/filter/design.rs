//! Low pass IIR filter design.
//!
//! The analog prototype poles are placed for the requested family, scaled
//! to the pre-warped cutoff and mapped to the z-plane with the bilinear
//! transform.  All zeros of a low pass prototype sit at infinity and land on
//! `z = -1`.  Conjugate pole pairs become second order sections, the real
//! pole of an odd order design becomes a first order section.  Sections are
//! ordered from the smallest pole radius to the largest.
//!
//! Every section is scaled to unity gain at DC, so the whole cascade passes a
//! constant signal unchanged.  For an even order Chebyshev Type I design this
//! places the passband ripple between 0 dB and `+ripple_db`.

use num::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{invalid, unstable, Result};
use crate::filter::iir::{Biquad, FilterCascade};

/// Poles closer to the unit circle than this are treated as unstable.
const MAX_POLE_RADIUS: f64 = 1.0 - 1e-9;

/// Low pass filter family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFamily {
    /// Maximally flat passband.
    Butterworth,
    /// Equiripple passband with `ripple_db` of ripple, steeper roll-off.
    Chebyshev1 { ripple_db: f64 },
}

impl FilterFamily {
    /// Left half plane poles of the unit cutoff analog prototype.
    ///
    /// Only the pole with non-negative imaginary part of each conjugate pair
    /// is returned, followed by the real pole for odd orders.
    fn prototype_poles(&self, order: usize) -> Vec<Complex<f64>> {
        let n = order as f64;
        let pole = |theta: f64| match *self {
            FilterFamily::Butterworth => -Complex::new(0.0, theta).exp(),
            FilterFamily::Chebyshev1 { ripple_db } => {
                let eps = (10.0_f64.powf(ripple_db / 10.0) - 1.0).sqrt();
                let mu = (1.0 / eps).asinh() / n;
                -Complex::new(mu, theta).sinh()
            }
        };

        (0..(order + 1) / 2)
            .map(|k| {
                let m = 2 * k as i64 + 1 - order as i64;
                let p = pole(PI * m as f64 / (2.0 * n));
                if m == 0 {
                    Complex::new(p.re, 0.0)
                } else {
                    p
                }
            })
            .collect()
    }
}

/// Designs a low pass filter as a cascade of second order sections.
///
/// # Arguments
///
/// * `family` - Butterworth or Chebyshev Type I (with its passband ripple).
/// * `order` - Filter order, at least 1.
/// * `cutoff` - Cutoff frequency in Hz, strictly between 0 and Nyquist.
///   For Chebyshev Type I it is the passband edge.
/// * `sample_rate` - Sampling rate in Hz.
///
/// # Examples
///
/// ```
/// use denoise_rs::filter::design::{design_low_pass, FilterFamily};
///
/// let cascade = design_low_pass(FilterFamily::Butterworth, 4, 1500.0, 100_000.0).unwrap();
/// assert_eq!(cascade.len(), 2);
/// assert!(cascade.is_stable());
/// assert!((cascade.dc_gain() - 1.0).abs() < 1e-9);
/// ```
pub fn design_low_pass(
    family: FilterFamily,
    order: usize,
    cutoff: f64,
    sample_rate: f64,
) -> Result<FilterCascade> {
    if order < 1 {
        return invalid("filter order must be at least 1");
    }
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return invalid(format!("sampling rate must be positive, got {}", sample_rate));
    }
    let nyquist = sample_rate / 2.0;
    if !(cutoff > 0.0 && cutoff < nyquist) {
        return invalid(format!(
            "cutoff {} Hz must lie strictly between 0 and {} Hz",
            cutoff, nyquist
        ));
    }
    if let FilterFamily::Chebyshev1 { ripple_db } = family {
        if !(ripple_db.is_finite() && ripple_db > 0.0) {
            return invalid(format!("passband ripple must be positive, got {}", ripple_db));
        }
    }

    let fs2 = 2.0 * sample_rate;
    let warped = fs2 * (PI * cutoff / sample_rate).tan();

    let mut sections = Vec::with_capacity((order + 1) / 2);
    for p in family.prototype_poles(order) {
        let s = p * warped;
        let z = (fs2 + s) / (fs2 - s);
        let radius = z.norm();
        if !(radius < MAX_POLE_RADIUS) {
            return unstable(format!(
                "pole radius {} too close to the unit circle (cutoff {} Hz, fs {} Hz)",
                radius, cutoff, sample_rate
            ));
        }

        let (b, a) = if z.im == 0.0 {
            ([1.0, 1.0, 0.0], [1.0, -z.re, 0.0])
        } else {
            ([1.0, 2.0, 1.0], [1.0, -2.0 * z.re, z.norm_sqr()])
        };
        let gain = a.iter().sum::<f64>() / b.iter().sum::<f64>();
        let section = Biquad::new([b[0] * gain, b[1] * gain, b[2] * gain], a)?;
        sections.push((radius, section));
    }
    sections.sort_by(|x, y| x.0.total_cmp(&y.0));

    log::debug!(
        "designed {:?} low pass, order {}, cutoff {} Hz at {} Hz: pole radii {:?}",
        family,
        order,
        cutoff,
        sample_rate,
        sections.iter().map(|s| s.0).collect::<Vec<_>>()
    );

    let cascade = FilterCascade::new(sections.into_iter().map(|s| s.1).collect())?;
    if !cascade.is_stable() {
        return unstable("designed cascade has a section outside the stability triangle");
    }
    Ok(cascade)
}

#[cfg(test)]
mod test {
    use crate::filter::design::*;
    use assert_approx_eq::assert_approx_eq;

    fn radius(section: &Biquad) -> f64 {
        if section.a[2] == 0.0 {
            section.a[1].abs()
        } else {
            section.a[2].sqrt()
        }
    }

    #[test]
    fn test_butterworth_second_order_quarter_band() {
        // Matches scipy.signal.butter(2, 0.5).
        let cascade = design_low_pass(FilterFamily::Butterworth, 2, 250.0, 1000.0).unwrap();
        assert_eq!(cascade.len(), 1);
        let s = cascade.sections()[0];
        assert_approx_eq!(s.b[0], 0.292_893_218_8, 1e-9);
        assert_approx_eq!(s.b[1], 0.585_786_437_6, 1e-9);
        assert_approx_eq!(s.b[2], 0.292_893_218_8, 1e-9);
        assert_approx_eq!(s.a[1], 0.0, 1e-12);
        assert_approx_eq!(s.a[2], 0.171_572_875_3, 1e-9);
    }

    #[test]
    fn test_butterworth_first_order() {
        // Matches scipy.signal.butter(1, 0.5).
        let cascade = design_low_pass(FilterFamily::Butterworth, 1, 250.0, 1000.0).unwrap();
        let s = cascade.sections()[0];
        assert_approx_eq!(s.b[0], 0.5, 1e-12);
        assert_approx_eq!(s.b[1], 0.5, 1e-12);
        assert_eq!(s.b[2], 0.0);
        assert_approx_eq!(s.a[1], 0.0, 1e-12);
        assert_eq!(s.a[2], 0.0);
    }

    #[test]
    fn test_butterworth_half_power_at_cutoff() {
        for order in 1..=8 {
            let cascade =
                design_low_pass(FilterFamily::Butterworth, order, 1500.0, 100_000.0).unwrap();
            assert_approx_eq!(cascade.magnitude_at(1500.0, 100_000.0), 0.5_f64.sqrt(), 1e-9);
            assert_approx_eq!(cascade.dc_gain(), 1.0, 1e-9);
        }
    }

    #[test]
    fn test_chebyshev_passband_edge() {
        let ripple = 10.0_f64.powf(-1.0 / 20.0);
        let family = FilterFamily::Chebyshev1 { ripple_db: 1.0 };

        // Odd order: unity at DC, -rp dB at the edge.
        let odd = design_low_pass(family, 3, 1500.0, 100_000.0).unwrap();
        assert_approx_eq!(odd.dc_gain(), 1.0, 1e-9);
        assert_approx_eq!(odd.magnitude_at(1500.0, 100_000.0), ripple, 1e-9);

        // Even order: unity at DC and at the edge, ripple peaks above.
        let even = design_low_pass(family, 4, 1500.0, 100_000.0).unwrap();
        assert_approx_eq!(even.dc_gain(), 1.0, 1e-9);
        assert_approx_eq!(even.magnitude_at(1500.0, 100_000.0), 1.0, 1e-9);
        let peak = (0..1500)
            .map(|f| even.magnitude_at(f as f64, 100_000.0))
            .fold(0.0, f64::max);
        assert_approx_eq!(peak, 1.0 / ripple, 1e-3);
    }

    #[test]
    fn test_chebyshev_rolls_off_faster_than_butterworth() {
        let butter = design_low_pass(FilterFamily::Butterworth, 4, 1500.0, 100_000.0).unwrap();
        let cheby = design_low_pass(
            FilterFamily::Chebyshev1 { ripple_db: 1.0 },
            4,
            1500.0,
            100_000.0,
        )
        .unwrap();
        let b = butter.magnitude_at(5000.0, 100_000.0);
        let c = cheby.magnitude_at(5000.0, 100_000.0);
        assert!(c < b);
    }

    #[test]
    fn test_section_layout_and_ordering() {
        for &family in &[
            FilterFamily::Butterworth,
            FilterFamily::Chebyshev1 { ripple_db: 0.5 },
        ] {
            let cascade = design_low_pass(family, 7, 9000.0, 100_000.0).unwrap();
            assert_eq!(cascade.len(), 4);
            let first_order: Vec<_> = cascade
                .sections()
                .iter()
                .filter(|s| s.a[2] == 0.0 && s.b[2] == 0.0)
                .collect();
            assert_eq!(first_order.len(), 1);
            let radii: Vec<f64> = cascade.sections().iter().map(radius).collect();
            assert!(radii.windows(2).all(|w| w[0] <= w[1]));
            assert!(radii.iter().all(|&r| r < 1.0));
        }
    }

    #[test]
    fn test_design_is_repeatable() {
        let family = FilterFamily::Chebyshev1 { ripple_db: 1.0 };
        let a = design_low_pass(family, 6, 1500.0, 100_000.0).unwrap();
        let b = design_low_pass(family, 6, 1500.0, 100_000.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let fam = FilterFamily::Butterworth;
        assert!(design_low_pass(fam, 0, 1500.0, 100_000.0).is_err());
        assert!(design_low_pass(fam, 4, 0.0, 100_000.0).is_err());
        assert!(design_low_pass(fam, 4, 50_000.0, 100_000.0).is_err());
        assert!(design_low_pass(fam, 4, -5.0, 100_000.0).is_err());
        assert!(design_low_pass(fam, 4, 1500.0, 0.0).is_err());
        let flat = FilterFamily::Chebyshev1 { ripple_db: 0.0 };
        assert!(design_low_pass(flat, 4, 1500.0, 100_000.0).is_err());
    }

    #[test]
    fn test_cutoff_at_nyquist_edge_is_unstable() {
        let cutoff = 50_000.0 * (1.0 - 1e-15);
        match design_low_pass(FilterFamily::Butterworth, 3, cutoff, 100_000.0) {
            Err(crate::error::FilterError::NumericInstability(_)) => (),
            other => panic!("expected numeric instability, got {:?}", other),
        }
    }
}
