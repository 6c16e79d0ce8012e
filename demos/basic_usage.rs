// demos/basic_usage.rs
//! Basic usage example for ECG Core

use ecg_core::simulation::{EcgSynthesizer, NoiseConfig, SynthesisConfig};
use ecg_core::{ConfigLoader, EcgPipeline};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("ECG Core Basic Usage Example");
    println!("============================");

    // Load configuration
    println!("Loading configuration...");
    let config = ConfigLoader::new().load()?;
    let summary = config.get_summary();
    println!("Configuration loaded successfully");
    println!("  - Wavelet: {} ({} levels)", summary.wavelet, summary.levels);
    println!("  - Refractory period: {} s", summary.refractory_period_s);
    println!(
        "  - Normal heart rate: {}..{} bpm",
        summary.heart_rate_range_bpm.0, summary.heart_rate_range_bpm.1
    );

    // Synthesize a noisy record
    println!("\nSynthesizing record...");
    let synth = EcgSynthesizer::new(SynthesisConfig {
        sampling_rate_hz: 360.0,
        num_samples: 7200,
        heart_rate_bpm: 68.0,
        rr_jitter_s: 0.03,
        noise: NoiseConfig {
            white_noise_std_mv: 0.04,
            powerline_amplitude_mv: 0.05,
            baseline_wander_amplitude_mv: 0.15,
            ..NoiseConfig::default()
        },
        ..Default::default()
    })?;
    let record = synth.generate()?;
    println!(
        "  - {} samples at {} Hz ({:.1} s), {} beats placed",
        record.len(),
        record.sampling_rate_hz(),
        record.duration_s(),
        synth.r_peak_indices().len()
    );

    // Analyze
    println!("\nRunning pipeline...");
    let pipeline = EcgPipeline::new(config)?;
    let outcome = pipeline.run(record)?;
    let report = &outcome.report;

    println!("Detected {} beats", report.beat_count());
    if let Some(bpm) = report.summary.mean_heart_rate_bpm {
        println!("  - Mean heart rate: {:.1} bpm ({})", bpm, report.summary.heart_rate_bracket);
    }
    println!("  - Rhythm: {}", report.summary.rhythm);
    if let Some(sdnn) = report.summary.sdnn_s {
        println!("  - SDNN: {:.1} ms", sdnn * 1000.0);
    }
    println!("  - Estimated noise sigma: {:.3} mV", outcome.denoised.noise_sigma());
    if let Some(snr) = outcome.quality.residual_snr_db {
        println!("  - Residual SNR: {:.1} dB", snr);
    }

    println!("\nPer-beat labels:");
    for beat in report.beats.iter().take(5) {
        println!(
            "  r={:5} hr={:>6} pq={} st={} t={}",
            beat.r_index,
            beat.heart_rate_bpm
                .map(|hr| format!("{:.1}", hr))
                .unwrap_or_else(|| "-".to_string()),
            beat.pq,
            beat.st,
            beat.t_wave
        );
    }

    println!("\nJSON report:");
    println!("{}", report.to_json()?);

    Ok(())
}
