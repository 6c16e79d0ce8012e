// src/simulation/noise_models.rs
//! Additive noise for synthetic ECG records

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::NoiseConfig;

/// Seeded mix of white noise, powerline interference and baseline wander
pub struct NoiseModel {
    config: NoiseConfig,
    rng: StdRng,
    harmonics: Vec<HarmonicComponent>,
}

struct HarmonicComponent {
    frequency_multiplier: f64,
    amplitude_factor: f64,
    phase_offset: f64,
}

impl NoiseModel {
    pub fn new(config: &NoiseConfig, seed: u64) -> Self {
        let harmonics = vec![
            HarmonicComponent {
                frequency_multiplier: 1.0,
                amplitude_factor: 1.0,
                phase_offset: 0.0,
            },
            HarmonicComponent {
                frequency_multiplier: 3.0,
                amplitude_factor: 0.15,
                phase_offset: PI / 6.0,
            },
        ];

        Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed),
            harmonics,
        }
    }

    /// Noise sample at time `t` seconds
    pub fn sample(&mut self, t: f64) -> f64 {
        let mut noise = 0.0;

        if self.config.white_noise_std_mv > 0.0 {
            noise += self.gaussian() * self.config.white_noise_std_mv;
        }

        if self.config.powerline_amplitude_mv > 0.0 {
            let phase = 2.0 * PI * self.config.powerline_frequency_hz * t;
            let interference: f64 = self
                .harmonics
                .iter()
                .map(|h| (phase * h.frequency_multiplier + h.phase_offset).sin() * h.amplitude_factor)
                .sum();
            noise += interference * self.config.powerline_amplitude_mv;
        }

        if self.config.baseline_wander_amplitude_mv > 0.0 {
            let phase = 2.0 * PI * self.config.baseline_wander_frequency_hz * t;
            noise += phase.sin() * self.config.baseline_wander_amplitude_mv;
        }

        noise
    }

    /// Standard normal sample via the Box-Muller transform
    fn gaussian(&mut self) -> f64 {
        // 1 - u keeps the logarithm argument in (0, 1]
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_model() {
        let mut model = NoiseModel::new(&NoiseConfig::silent(), 1);
        assert!((0..100).all(|i| model.sample(i as f64 / 250.0) == 0.0));
    }

    #[test]
    fn test_white_noise_statistics() {
        let config = NoiseConfig {
            white_noise_std_mv: 0.5,
            ..NoiseConfig::silent()
        };
        let mut model = NoiseModel::new(&config, 7);
        let samples: Vec<f64> = (0..20_000).map(|i| model.sample(i as f64)).collect();

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.02);
        assert!((var.sqrt() - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let config = NoiseConfig::default();
        let mut a = NoiseModel::new(&config, 3);
        let mut b = NoiseModel::new(&config, 3);
        for i in 0..50 {
            let t = i as f64 / 250.0;
            assert_eq!(a.sample(t), b.sample(t));
        }
    }
}
