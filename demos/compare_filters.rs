use denoise_rs::prelude::*;
use std::env;
use std::fs;

/// Runs every denoising filter over a noisy square wave and a noisy sine
/// wave and logs how far each output is from the clean reference.
///
/// An optional first argument names a JSON harness config; its waveform,
/// SNR and transform size replace the defaults for both runs.
///
/// Run with `RUST_LOG=info cargo run --example compare_filters`.
fn main() -> Result<()> {
    env_logger::init();

    let base = match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).map_err(|e| {
                FilterError::InvalidParameter(format!("cannot read {}: {}", path, e))
            })?;
            Some(HarnessConfig::from_json(&text)?)
        }
        None => None,
    };

    for &kind in &[WaveformKind::Square, WaveformKind::Sine] {
        let config = match &base {
            Some(c) => HarnessConfig {
                waveform: Waveform { kind, ..c.waveform },
                ..c.clone()
            },
            None => HarnessConfig::new(kind, FilterChoice::exponential()),
        };
        let results = compare_filters(
            &config.waveform,
            config.snr_db,
            config.transform_size,
            &FilterChoice::all(kind),
            42,
        )?;

        log::info!(
            "{:?} wave, {} samples at {} Hz, target SNR {} dB",
            kind,
            config.waveform.synthesize()?.len(),
            config.waveform.sample_rate,
            config.snr_db
        );
        for result in &results {
            log::info!(
                "  {:<12} noisy rms {:.4}  filtered rms {:.4}  snr {:.2} dB  peak {:?} Hz",
                result.filter.name(),
                result.noisy_rms_error()?,
                result.filtered_rms_error()?,
                result.achieved_snr_db(),
                result.filtered.spectrum.peak_frequency()
            );
        }
    }
    Ok(())
}
