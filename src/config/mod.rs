// src/config/mod.rs
//! Configuration management for the analysis pipeline
//!
//! Every threshold the pipeline uses lives in an explicit [`AnalysisConfig`]
//! value. Nothing is stored in module-level state, so records analysed with
//! different reference ranges never interfere with one another.

pub mod constants;
pub mod loader;
pub mod processing_config;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use processing_config::*;

use serde::{Deserialize, Serialize};

use crate::error::EcgResult;

/// Complete analysis configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub denoise: DenoiseConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub intervals: IntervalConfig,

    #[serde(default)]
    pub classification: ClassificationConfig,
}

impl AnalysisConfig {
    /// Validate every section, reporting the first violation
    pub fn validate(&self) -> EcgResult<()> {
        self.denoise.validate()?;
        self.detection.validate()?;
        self.intervals.validate()?;
        self.classification.validate()?;
        Ok(())
    }

    /// Get configuration summary
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            wavelet: self.denoise.wavelet.name().to_string(),
            levels: self.denoise.levels,
            refractory_period_s: self.detection.refractory_period_s,
            heart_rate_range_bpm: (
                self.classification.bradycardia_below_bpm,
                self.classification.tachycardia_above_bpm,
            ),
            pq_range_s: (self.classification.pq_min_s, self.classification.pq_max_s),
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub wavelet: String,
    pub levels: usize,
    pub refractory_period_s: f64,
    pub heart_rate_range_bpm: (f64, f64),
    pub pq_range_s: (f64, f64),
}
