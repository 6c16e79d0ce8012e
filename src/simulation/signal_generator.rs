// src/simulation/signal_generator.rs
//! Synthetic ECG generation with known ground truth

use tracing::debug;

use super::config::{Deflection, NoiseConfig, SynthesisConfig};
use super::noise_models::NoiseModel;
use crate::error::EcgResult;
use crate::signal::Signal;

/// Template support on either side of an R-peak, in seconds
const TEMPLATE_HALF_SPAN_S: f64 = 1.0;
/// Shortest RR the jitter may produce, in seconds
const MIN_RR_S: f64 = 0.25;
/// ST-segment plateau centre after the S wave, in seconds
const ST_PLATEAU_OFFSET_S: f64 = 0.08;
const ST_PLATEAU_WIDTH_S: f64 = 0.035;

/// Gaussian-sum ECG synthesizer
///
/// Beat times are drawn once at construction, so [`EcgSynthesizer::generate`]
/// always returns the same record and [`EcgSynthesizer::r_peak_indices`] is the
/// exact ground truth for it.
pub struct EcgSynthesizer {
    config: SynthesisConfig,
    beat_times_s: Vec<f64>,
}

impl EcgSynthesizer {
    pub fn new(config: SynthesisConfig) -> EcgResult<Self> {
        config.validate()?;

        let jitter_config = NoiseConfig {
            white_noise_std_mv: config.rr_jitter_s,
            ..NoiseConfig::silent()
        };
        let mut jitter = NoiseModel::new(&jitter_config, config.seed);

        let base_rr = 60.0 / config.heart_rate_bpm;
        let duration = config.duration_s();
        let mut beat_times_s = Vec::new();
        let mut t = config.first_beat_s;
        while t < duration {
            beat_times_s.push(t);
            t += (base_rr + jitter.sample(t)).max(MIN_RR_S);
        }

        debug!(beats = beat_times_s.len(), duration_s = duration, "synthesized beat times");
        Ok(Self { config, beat_times_s })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// R-peak times in seconds
    pub fn beat_times_s(&self) -> &[f64] {
        &self.beat_times_s
    }

    /// R-peak sample indices inside the record
    pub fn r_peak_indices(&self) -> Vec<usize> {
        let fs = self.config.sampling_rate_hz;
        self.beat_times_s
            .iter()
            .map(|t| (t * fs).round() as usize)
            .filter(|&i| i < self.config.num_samples)
            .collect()
    }

    /// Render the record
    pub fn generate(&self) -> EcgResult<Signal> {
        let fs = self.config.sampling_rate_hz;
        let n = self.config.num_samples;
        let m = &self.config.morphology;
        let waves = [m.p, m.q, m.r, m.s, m.t];
        let st_plateau = Deflection::new(
            m.st_offset_mv,
            ST_PLATEAU_WIDTH_S,
            m.s.offset_s + ST_PLATEAU_OFFSET_S,
        );

        let mut samples = vec![0.0; n];
        for &beat in &self.beat_times_s {
            let lo = (((beat - TEMPLATE_HALF_SPAN_S) * fs).floor().max(0.0)) as usize;
            let hi = (((beat + TEMPLATE_HALF_SPAN_S) * fs).ceil() as usize).min(n);
            for (i, sample) in samples.iter_mut().enumerate().take(hi).skip(lo) {
                let dt = i as f64 / fs - beat;
                *sample += waves.iter().map(|w| w.at(dt)).sum::<f64>();
                if m.st_offset_mv != 0.0 {
                    *sample += st_plateau.at(dt);
                }
            }
        }

        let mut noise = NoiseModel::new(&self.config.noise, self.config.seed.wrapping_add(1));
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample += noise.sample(i as f64 / fs);
        }

        Signal::new(samples, fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet(config: SynthesisConfig) -> SynthesisConfig {
        SynthesisConfig {
            noise: NoiseConfig::silent(),
            ..config
        }
    }

    #[test]
    fn test_ground_truth_positions() {
        let synth = EcgSynthesizer::new(quiet(SynthesisConfig::default())).unwrap();
        let peaks = synth.r_peak_indices();
        // 75 bpm at 250 Hz, first beat at 0.4 s
        assert_eq!(peaks.len(), 13);
        assert!(peaks.iter().enumerate().all(|(k, &p)| p == 100 + 200 * k));

        let signal = synth.generate().unwrap();
        assert_eq!(signal.len(), 2560);
        for &p in &peaks {
            assert!(signal.samples()[p] > signal.samples()[p - 1]);
            assert!(signal.samples()[p] > signal.samples()[p + 1]);
        }
    }

    #[test]
    fn test_generation_is_repeatable() {
        let config = SynthesisConfig {
            rr_jitter_s: 0.05,
            ..Default::default()
        };
        let a = EcgSynthesizer::new(config.clone()).unwrap();
        let b = EcgSynthesizer::new(config).unwrap();
        assert_eq!(a.r_peak_indices(), b.r_peak_indices());
        assert_eq!(a.generate().unwrap(), a.generate().unwrap());
        assert_eq!(a.generate().unwrap(), b.generate().unwrap());
    }

    #[test]
    fn test_st_offset_raises_segment() {
        let base = quiet(SynthesisConfig::default());
        let mut raised = base.clone();
        raised.morphology.st_offset_mv = 0.2;

        let flat = EcgSynthesizer::new(base).unwrap().generate().unwrap();
        let lifted = EcgSynthesizer::new(raised).unwrap().generate().unwrap();
        // ST point of the first beat: R at 100, S + 80 ms = 110 ms after R
        let st = 100 + 27;
        assert!(lifted.samples()[st] - flat.samples()[st] > 0.15);
    }

    #[test]
    fn test_invalid_config() {
        let config = SynthesisConfig {
            heart_rate_bpm: 0.0,
            ..Default::default()
        };
        assert!(EcgSynthesizer::new(config).is_err());
    }
}
