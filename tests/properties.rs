use denoise_rs::prelude::*;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

const FS: f64 = 100_000.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn uniform_signal(n: usize, bound: f64, seed: u64) -> Signal {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new_inclusive(-bound, bound);
    let samples = (0..n).map(|_| rng.sample(&dist)).collect();
    Signal::new(samples, FS).unwrap()
}

fn families() -> Vec<FilterFamily> {
    vec![
        FilterFamily::Butterworth,
        FilterFamily::Chebyshev1 { ripple_db: 1.0 },
    ]
}

#[test]
fn filters_preserve_length() {
    init_logging();
    let cascade = design_low_pass(FilterFamily::Butterworth, 5, 1500.0, FS).unwrap();
    for &n in &[1, 2, 17, 500, 4096] {
        let input = uniform_signal(n, 1.0, n as u64);
        assert_eq!(exponential_smooth(&input, 0.05).unwrap().len(), n);
        assert_eq!(apply_cascade(&cascade, &input).unwrap().len(), n);
        assert_eq!(
            kalman_filter(&input, KalmanParams::new(1e-4, 0.1)).unwrap().len(),
            n
        );
    }
}

#[test]
fn smoothing_with_alpha_one_is_identity() {
    for seed in 0..5 {
        let input = uniform_signal(1000, 3.0, seed);
        let output = exponential_smooth(&input, 1.0).unwrap();
        assert_eq!(output.samples(), input.samples());
    }
}

#[test]
fn cascade_passes_dc_after_short_transient() {
    init_logging();
    // Fast settling design: every sample after the first 20 is checked.
    let c = 2.5;
    let input = Signal::new(vec![c; 50], 1000.0).unwrap();
    let cascade = design_low_pass(FilterFamily::Butterworth, 2, 200.0, 1000.0).unwrap();
    let output = apply_cascade(&cascade, &input).unwrap();
    for y in &output.samples()[20..] {
        assert!(((y - c) / c).abs() < 1e-3, "sample {} not settled", y);
    }
}

#[test]
fn cascade_passes_dc_for_default_designs() {
    let c = -3.0;
    let input = Signal::new(vec![c; 5000], FS).unwrap();
    for family in families() {
        for &order in &[1, 2, 4, 8] {
            let cascade = design_low_pass(family, order, 1500.0, FS).unwrap();
            let output = apply_cascade(&cascade, &input).unwrap();
            for y in &output.samples()[4000..] {
                assert!(((y - c) / c).abs() < 1e-3);
            }
        }
    }
}

#[test]
fn designs_are_stable_for_bounded_input() {
    init_logging();
    let noise = uniform_signal(20_000, 10.0, 11);
    let square = synthesize(WaveformKind::Square, FS, 0.2, 1000.0, 10.0).unwrap();
    for family in families() {
        for &order in &[1, 2, 4, 8] {
            for &cutoff in &[100.0, 1500.0, 9000.0] {
                let cascade = design_low_pass(family, order, cutoff, FS).unwrap();
                assert!(cascade.is_stable());
                for input in &[&noise, &square] {
                    let output = apply_cascade(&cascade, input).unwrap();
                    let peak = output.samples().iter().fold(0.0_f64, |m, y| m.max(y.abs()));
                    assert!(
                        peak <= 100.0,
                        "{:?} order {} at {} Hz peaked at {}",
                        family,
                        order,
                        cutoff,
                        peak
                    );
                }
            }
        }
    }
}

#[test]
fn kalman_converges_on_constant() {
    // Statistical property, checked across seeds.
    let truth = 5.0;
    let params = KalmanParams::new(1e-4, 0.1);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut within = 0;
    let mut tail_means = Vec::new();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = (0..1000).map(|_| truth + normal.sample(&mut rng)).collect();
        let input = Signal::new(samples, 1000.0).unwrap();
        let output = kalman_filter(&input, params).unwrap();
        let tail = &output.samples()[950..];
        let mean = tail.iter().sum::<f64>() / tail.len() as f64;
        if (mean - truth).abs() < 0.2 {
            within += 1;
        }
        tail_means.push(mean);
    }
    assert!(within >= 16, "only {} of 20 runs converged", within);
    let grand = tail_means.iter().sum::<f64>() / tail_means.len() as f64;
    assert!((grand - truth).abs() < 0.1);
}

#[test]
fn kalman_covariance_never_grows_without_process_noise() {
    let input = uniform_signal(2000, 4.0, 5);
    for &r in &[1e-3, 0.1, 10.0] {
        let trace = kalman_trace(&input, KalmanParams::new(0.0, r)).unwrap();
        assert!(trace.covariances.windows(2).all(|w| w[1] <= w[0]));
    }
}

#[test]
fn spectrum_peaks_on_grid_frequency() {
    let n = 1024;
    for &m in &[1, 10, 100, 511] {
        let f0 = m as f64 * FS / n as f64;
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * f0 * i as f64 / FS).sin())
            .collect();
        let signal = Signal::new(samples, FS).unwrap();
        let spec = spectrum(&signal, n).unwrap();
        assert_eq!(spec.len(), n / 2);
        assert_eq!(spec.peak_bin(), Some(m));
        let peak = spec.magnitudes[m];
        for (i, mag) in spec.magnitudes.iter().enumerate() {
            if i != m {
                assert!(peak >= 10.0 * mag);
            }
        }
        assert!(spec.frequencies.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn noise_matches_requested_snr() {
    let mut rng = StdRng::seed_from_u64(2024);
    for &kind in &[WaveformKind::Square, WaveformKind::Sine] {
        let clean = synthesize(kind, FS, 0.2, 1000.0, 1.0).unwrap();
        assert!(clean.len() >= 10_000);
        for &snr in &[-3.0, 0.0, 10.0, 20.0] {
            let noisy = add_noise(&clean, snr, &mut rng).unwrap();
            let noise: Vec<f64> = noisy
                .samples()
                .iter()
                .zip(clean.samples())
                .map(|(n, c)| n - c)
                .collect();
            let noise_power = noise.iter().map(|x| x * x).sum::<f64>() / noise.len() as f64;
            let measured = 10.0 * (clean.power() / noise_power).log10();
            assert!((measured - snr).abs() < 1.0, "{} dB gave {} dB", snr, measured);
        }
    }
}

#[test]
fn filtering_is_deterministic_for_a_seeded_source() {
    let clean = synthesize(WaveformKind::Square, FS, 0.005, 1000.0, 1.0).unwrap();
    let a = add_noise(&clean, -3.0, &mut StdRng::seed_from_u64(77)).unwrap();
    let b = add_noise(&clean, -3.0, &mut StdRng::seed_from_u64(77)).unwrap();
    assert_eq!(a, b);

    let family = FilterFamily::Chebyshev1 { ripple_db: 1.0 };
    let cascade = design_low_pass(family, 4, 1500.0, FS).unwrap();
    assert_eq!(
        apply_cascade(&cascade, &a).unwrap(),
        apply_cascade(&cascade, &b).unwrap()
    );
    let params = KalmanParams::new(1e-4, 0.1);
    assert_eq!(
        kalman_filter(&a, params).unwrap(),
        kalman_filter(&b, params).unwrap()
    );
}

#[test]
fn harness_runs_every_filter_on_both_waveforms() {
    init_logging();
    for &kind in &[WaveformKind::Square, WaveformKind::Sine] {
        for filter in FilterChoice::all(kind) {
            let config = HarnessConfig::new(kind, filter);
            let result = evaluate(&config, &mut StdRng::seed_from_u64(1)).unwrap();
            assert_eq!(result.clean.signal.len(), 500);
            assert_eq!(result.filtered.signal.len(), 500);
            assert_eq!(result.noisy.spectrum.frequencies, result.filtered.spectrum.frequencies);
            assert_eq!(result.clean.spectrum.peak_frequency(), Some(FS * 10.0 / 1024.0));
        }
    }
}
