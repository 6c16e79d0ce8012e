// tests/detection_tests.rs
//! Fiducial detection against synthetic records with known beat positions

use ecg_core::config::{DenoiseConfig, DetectionConfig};
use ecg_core::simulation::{EcgSynthesizer, NoiseConfig, SynthesisConfig};
use ecg_core::{DenoisedSignal, EcgError, FiducialDetector, Signal, WaveletDenoiser};
use proptest::prelude::*;

fn detect(signal: Signal) -> Vec<ecg_core::Beat> {
    let denoised = WaveletDenoiser::new(DenoiseConfig::default())
        .unwrap()
        .denoise(signal)
        .unwrap();
    FiducialDetector::new(DetectionConfig::default())
        .unwrap()
        .detect(&denoised)
        .unwrap()
}

fn detect_with_truth(config: SynthesisConfig) -> (Vec<ecg_core::Beat>, Vec<usize>) {
    let synth = EcgSynthesizer::new(config).unwrap();
    let truth = synth.r_peak_indices();
    let beats = detect(synth.generate().unwrap());
    assert_eq!(beats.len(), truth.len(), "beat count");
    (beats, truth)
}

#[test]
fn test_periodic_train_rr_within_one_sample() {
    let (beats, truth) = detect_with_truth(SynthesisConfig {
        noise: NoiseConfig {
            white_noise_std_mv: 0.03,
            ..NoiseConfig::silent()
        },
        ..Default::default()
    });

    for (pair, true_pair) in beats.windows(2).zip(truth.windows(2)) {
        let detected_rr = pair[1].r as i64 - pair[0].r as i64;
        let true_rr = true_pair[1] as i64 - true_pair[0] as i64;
        assert!(
            (detected_rr - true_rr).abs() <= 1,
            "RR {} samples, expected {}",
            detected_rr,
            true_rr
        );
    }
}

#[test]
fn test_jittered_beats_with_interference() {
    let (beats, truth) = detect_with_truth(SynthesisConfig {
        sampling_rate_hz: 360.0,
        num_samples: 3600,
        heart_rate_bpm: 64.0,
        rr_jitter_s: 0.04,
        noise: NoiseConfig {
            white_noise_std_mv: 0.02,
            powerline_amplitude_mv: 0.03,
            baseline_wander_amplitude_mv: 0.1,
            ..NoiseConfig::default()
        },
        seed: 11,
        ..Default::default()
    });

    for (beat, &expected) in beats.iter().zip(&truth) {
        assert!(beat.r.abs_diff(expected) <= 1, "R at {}, expected {}", beat.r, expected);
    }
}

#[test]
fn test_fiducial_order_on_clean_record() {
    let synth = EcgSynthesizer::new(SynthesisConfig {
        noise: NoiseConfig::silent(),
        ..Default::default()
    })
    .unwrap();
    let beats = detect(synth.generate().unwrap());

    for beat in &beats {
        if let (Some(p), Some(q), Some(s), Some(t)) = (beat.p, beat.q, beat.s, beat.t) {
            assert!(p < q && q < beat.r && beat.r < s && s < t, "{:?}", beat);
        }
    }
    // every interior beat has a full set of fiducials
    assert!(beats[1..beats.len() - 1].iter().all(|b| b.confident));
}

#[test]
fn test_beats_at_record_edges() {
    // R-peaks 4 samples from the start and 3 samples from the end
    let synth = EcgSynthesizer::new(SynthesisConfig {
        num_samples: 1008,
        heart_rate_bpm: 60.0,
        first_beat_s: 0.016,
        noise: NoiseConfig::silent(),
        ..Default::default()
    })
    .unwrap();
    let truth = synth.r_peak_indices();
    assert_eq!(truth, vec![4, 254, 504, 754, 1004]);

    let signal = DenoisedSignal::from_clean(synth.generate().unwrap());
    let beats = FiducialDetector::new(DetectionConfig::default())
        .unwrap()
        .detect(&signal)
        .unwrap();

    assert_eq!(beats.first().map(|b| b.r), Some(4));
    assert_eq!(beats.last().map(|b| b.r), Some(1004));
    let first = beats.first().unwrap();
    let last = beats.last().unwrap();
    assert!(first.p.is_none());
    assert!(last.t.is_none());
    assert!(!first.confident && !last.confident);
}

#[test]
fn test_flat_record_reports_no_beats() {
    let signal = DenoisedSignal::from_clean(Signal::new(vec![0.1; 2000], 500.0).unwrap());
    match FiducialDetector::new(DetectionConfig::default()).unwrap().detect(&signal) {
        Err(EcgError::NoBeatsDetected { samples, duration_s }) => {
            assert_eq!(samples, 2000);
            assert_eq!(duration_s, 4.0);
        }
        other => panic!("Expected NoBeatsDetected, got {:?}", other),
    }
}

#[test]
fn test_refractory_period_is_configurable() {
    // Beats 0.3 s apart collapse under a 0.4 s refractory period
    let synth = EcgSynthesizer::new(SynthesisConfig {
        heart_rate_bpm: 200.0,
        noise: NoiseConfig::silent(),
        ..Default::default()
    })
    .unwrap();
    let signal = DenoisedSignal::from_clean(synth.generate().unwrap());

    let default_beats = FiducialDetector::new(DetectionConfig::default())
        .unwrap()
        .detect(&signal)
        .unwrap();
    let slow = FiducialDetector::new(DetectionConfig {
        refractory_period_s: 0.4,
        ..Default::default()
    })
    .unwrap()
    .detect(&signal)
    .unwrap();

    assert_eq!(default_beats.len(), synth.r_peak_indices().len());
    assert!(slow.len() < default_beats.len());
}

#[test]
fn test_tall_t_waves_are_not_counted_as_beats() {
    let mut config = SynthesisConfig {
        noise: NoiseConfig::silent(),
        ..Default::default()
    };
    config.morphology.t.amplitude_mv = 0.6;

    let (beats, truth) = detect_with_truth(config);
    for (beat, &expected) in beats.iter().zip(&truth) {
        assert!(beat.r.abs_diff(expected) <= 1, "R at {}, expected {}", beat.r, expected);
    }
}

#[test]
fn test_t_waves_lifted_by_wander_are_not_counted_as_beats() {
    let (beats, truth) = detect_with_truth(SynthesisConfig {
        sampling_rate_hz: 500.0,
        num_samples: 5120,
        noise: NoiseConfig {
            white_noise_std_mv: 0.1,
            powerline_amplitude_mv: 0.1,
            baseline_wander_amplitude_mv: 0.3,
            ..NoiseConfig::default()
        },
        ..Default::default()
    });

    for (beat, &expected) in beats.iter().zip(&truth) {
        assert!(beat.r.abs_diff(expected) <= 10, "R at {}, expected {}", beat.r, expected);
    }
}

#[test]
fn test_invalid_t_wave_slope_ratio_rejected() {
    for ratio in [-0.1, 1.0, f64::NAN] {
        let config = DetectionConfig {
            t_wave_slope_ratio: ratio,
            ..Default::default()
        };
        match FiducialDetector::new(config) {
            Err(EcgError::Configuration { parameter, .. }) => assert_eq!(parameter, "t_wave_slope_ratio"),
            other => panic!("Expected configuration error for {}, got {:?}", ratio, other),
        }
    }
}

proptest! {
    #[test]
    fn prop_detection_never_panics(samples in prop::collection::vec(-3.0f64..3.0, 1..600)) {
        let signal = DenoisedSignal::from_clean(Signal::new(samples, 250.0).unwrap());
        let detector = FiducialDetector::new(DetectionConfig::default()).unwrap();
        match detector.detect(&signal) {
            Ok(beats) => {
                for beat in beats {
                    for index in [beat.p, beat.q, beat.s, beat.t].into_iter().flatten() {
                        prop_assert!(index < signal.len());
                    }
                }
            }
            Err(err) => prop_assert!(matches!(err, EcgError::NoBeatsDetected { .. }), "{:?}", err),
        }
    }
}
