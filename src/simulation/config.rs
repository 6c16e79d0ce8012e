// src/simulation/config.rs
//! Synthetic ECG configuration structures

use serde::{Deserialize, Serialize};

use crate::config::constants::signal::{
    DEFAULT_SAMPLING_RATE_HZ, MAX_SAMPLING_RATE_HZ, MIN_SAMPLING_RATE_HZ,
};
use crate::error::{require_positive, EcgError, EcgResult, PipelineStage};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub sampling_rate_hz: f64,
    /// Record length in samples
    pub num_samples: usize,
    pub heart_rate_bpm: f64,
    /// Standard deviation of the beat-to-beat RR perturbation, in seconds
    pub rr_jitter_s: f64,
    /// Time of the first R-peak, in seconds
    pub first_beat_s: f64,
    pub morphology: WaveMorphology,
    pub noise: NoiseConfig,
    pub seed: u64,
}

/// One Gaussian deflection of the PQRST complex
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Deflection {
    /// Peak amplitude in millivolts; negative for downward waves
    pub amplitude_mv: f64,
    /// Gaussian standard deviation in seconds
    pub width_s: f64,
    /// Centre relative to the R-peak, in seconds
    pub offset_s: f64,
}

impl Deflection {
    pub const fn new(amplitude_mv: f64, width_s: f64, offset_s: f64) -> Self {
        Self {
            amplitude_mv,
            width_s,
            offset_s,
        }
    }

    /// Contribution at `dt` seconds from the R-peak
    #[inline]
    pub fn at(&self, dt: f64) -> f64 {
        let z = (dt - self.offset_s) / self.width_s;
        self.amplitude_mv * (-0.5 * z * z).exp()
    }
}

/// Gaussian-sum PQRST template
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WaveMorphology {
    pub p: Deflection,
    pub q: Deflection,
    pub r: Deflection,
    pub s: Deflection,
    pub t: Deflection,
    /// Level added over the ST segment, in millivolts
    pub st_offset_mv: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Standard deviation of additive white Gaussian noise
    pub white_noise_std_mv: f64,
    pub powerline_frequency_hz: f64,
    pub powerline_amplitude_mv: f64,
    pub baseline_wander_frequency_hz: f64,
    pub baseline_wander_amplitude_mv: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
            num_samples: 2560,
            heart_rate_bpm: 75.0,
            rr_jitter_s: 0.0,
            first_beat_s: 0.4,
            morphology: WaveMorphology::default(),
            noise: NoiseConfig::default(),
            seed: 42,
        }
    }
}

impl Default for WaveMorphology {
    fn default() -> Self {
        Self {
            p: Deflection::new(0.15, 0.025, -0.16),
            q: Deflection::new(-0.1, 0.008, -0.03),
            r: Deflection::new(1.0, 0.01, 0.0),
            s: Deflection::new(-0.2, 0.008, 0.03),
            t: Deflection::new(0.3, 0.04, 0.25),
            st_offset_mv: 0.0,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            white_noise_std_mv: 0.02,
            powerline_frequency_hz: 50.0,
            powerline_amplitude_mv: 0.0,
            baseline_wander_frequency_hz: 0.3,
            baseline_wander_amplitude_mv: 0.0,
        }
    }
}

impl NoiseConfig {
    /// No noise of any kind
    pub fn silent() -> Self {
        Self {
            white_noise_std_mv: 0.0,
            powerline_amplitude_mv: 0.0,
            baseline_wander_amplitude_mv: 0.0,
            ..Default::default()
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> EcgResult<()> {
        const STAGE: PipelineStage = PipelineStage::Ingestion;

        if !(MIN_SAMPLING_RATE_HZ..=MAX_SAMPLING_RATE_HZ).contains(&self.sampling_rate_hz) {
            return Err(EcgError::configuration(
                STAGE,
                "sampling_rate_hz",
                format!(
                    "must be within {}..={} Hz, got {}",
                    MIN_SAMPLING_RATE_HZ, MAX_SAMPLING_RATE_HZ, self.sampling_rate_hz
                ),
            ));
        }
        if self.num_samples == 0 {
            return Err(EcgError::configuration(STAGE, "num_samples", "must be at least 1"));
        }
        require_positive(STAGE, "heart_rate_bpm", self.heart_rate_bpm)?;

        for (name, value) in [
            ("rr_jitter_s", self.rr_jitter_s),
            ("first_beat_s", self.first_beat_s),
            ("noise.white_noise_std_mv", self.noise.white_noise_std_mv),
            ("noise.powerline_amplitude_mv", self.noise.powerline_amplitude_mv),
            ("noise.baseline_wander_amplitude_mv", self.noise.baseline_wander_amplitude_mv),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EcgError::configuration(STAGE, name, "must be finite and >= 0"));
            }
        }

        let m = &self.morphology;
        for (name, wave) in [("p", m.p), ("q", m.q), ("r", m.r), ("s", m.s), ("t", m.t)] {
            require_positive(STAGE, format!("morphology.{}.width_s", name).as_str(), wave.width_s)?;
        }
        Ok(())
    }

    /// Record duration in seconds
    pub fn duration_s(&self) -> f64 {
        self.num_samples as f64 / self.sampling_rate_hz
    }
}
