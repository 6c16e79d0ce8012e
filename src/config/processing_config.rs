// src/config/processing_config.rs
//! Per-stage processing configuration structures

use serde::{Deserialize, Serialize};

use crate::config::constants::{classification, denoise, detection, intervals};
use crate::error::{require_positive, EcgError, EcgResult, PipelineStage};
use crate::processing::denoising::WaveletFamily;

/// Wavelet denoising configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DenoiseConfig {
    #[serde(default = "defaults::wavelet")]
    pub wavelet: WaveletFamily,

    #[serde(default = "defaults::levels")]
    pub levels: usize,

    #[serde(default = "defaults::shrinkage")]
    pub shrinkage: ShrinkageMode,

    #[serde(default = "defaults::threshold_rule")]
    pub threshold_rule: ThresholdRule,

    #[serde(default = "defaults::threshold_scale")]
    pub threshold_scale: f64,
}

/// How detail coefficients are shrunk once the threshold is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShrinkageMode {
    /// Zero below the threshold, shrink towards zero by the threshold above it
    Soft,
    /// Zero below the threshold, keep unchanged above it
    Hard,
}

/// How the shrinkage threshold is selected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum ThresholdRule {
    /// `sigma * sqrt(2 ln N)` with sigma estimated from the finest detail level
    Universal,
    /// A fixed amplitude, independent of the noise estimate
    Fixed { value: f64 },
}

/// R-peak and secondary fiducial detection configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub refractory_period_s: f64,
    pub threshold_fraction: f64,
    pub rolling_window_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_peak_height: Option<f64>,
    pub q_window_s: f64,
    pub s_window_s: f64,
    pub p_window_s: f64,
    pub min_st_gap_s: f64,
    pub t_window_rr_fraction: f64,
    pub expected_rr_s: f64,
    pub t_wave_rejection_window_s: f64,
    /// 0 disables T-wave rejection
    pub t_wave_slope_ratio: f64,
}

/// Interval and amplitude measurement configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct IntervalConfig {
    pub st_point_offset_s: f64,
    pub st_averaging_window_s: f64,
    pub p_onset_offset_s: f64,
    pub baseline_window_s: f64,
    pub fallback_baseline_start_s: f64,
    pub fallback_baseline_end_s: f64,
}

/// Reference ranges used by the classifier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClassificationConfig {
    pub bradycardia_below_bpm: f64,
    pub tachycardia_above_bpm: f64,
    pub rhythm_cv_threshold: f64,
    pub pq_min_s: f64,
    pub pq_max_s: f64,
    pub st_deviation_threshold_mv: f64,
    pub t_inversion_threshold_mv: f64,
    pub t_flat_threshold_mv: f64,
}

mod defaults {
    use super::{ShrinkageMode, ThresholdRule};
    use crate::config::constants::denoise;
    use crate::processing::denoising::WaveletFamily;

    pub fn wavelet() -> WaveletFamily { WaveletFamily::Db4 }
    pub fn levels() -> usize { denoise::DEFAULT_LEVELS }
    pub fn shrinkage() -> ShrinkageMode { ShrinkageMode::Soft }
    pub fn threshold_rule() -> ThresholdRule { ThresholdRule::Universal }
    pub fn threshold_scale() -> f64 { denoise::DEFAULT_THRESHOLD_SCALE }
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            wavelet: defaults::wavelet(),
            levels: defaults::levels(),
            shrinkage: defaults::shrinkage(),
            threshold_rule: defaults::threshold_rule(),
            threshold_scale: defaults::threshold_scale(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            refractory_period_s: detection::DEFAULT_REFRACTORY_PERIOD_S,
            threshold_fraction: detection::DEFAULT_THRESHOLD_FRACTION,
            rolling_window_s: detection::DEFAULT_ROLLING_WINDOW_S,
            min_peak_height: None,
            q_window_s: detection::DEFAULT_Q_WINDOW_S,
            s_window_s: detection::DEFAULT_S_WINDOW_S,
            p_window_s: detection::DEFAULT_P_WINDOW_S,
            min_st_gap_s: detection::DEFAULT_MIN_ST_GAP_S,
            t_window_rr_fraction: detection::DEFAULT_T_WINDOW_RR_FRACTION,
            expected_rr_s: detection::DEFAULT_EXPECTED_RR_S,
            t_wave_rejection_window_s: detection::DEFAULT_T_WAVE_REJECTION_WINDOW_S,
            t_wave_slope_ratio: detection::DEFAULT_T_WAVE_SLOPE_RATIO,
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            st_point_offset_s: intervals::DEFAULT_ST_POINT_OFFSET_S,
            st_averaging_window_s: intervals::DEFAULT_ST_AVERAGING_WINDOW_S,
            p_onset_offset_s: intervals::DEFAULT_P_ONSET_OFFSET_S,
            baseline_window_s: intervals::DEFAULT_BASELINE_WINDOW_S,
            fallback_baseline_start_s: intervals::DEFAULT_FALLBACK_BASELINE_START_S,
            fallback_baseline_end_s: intervals::DEFAULT_FALLBACK_BASELINE_END_S,
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            bradycardia_below_bpm: classification::DEFAULT_BRADYCARDIA_BELOW_BPM,
            tachycardia_above_bpm: classification::DEFAULT_TACHYCARDIA_ABOVE_BPM,
            rhythm_cv_threshold: classification::DEFAULT_RHYTHM_CV_THRESHOLD,
            pq_min_s: classification::DEFAULT_PQ_MIN_S,
            pq_max_s: classification::DEFAULT_PQ_MAX_S,
            st_deviation_threshold_mv: classification::DEFAULT_ST_DEVIATION_THRESHOLD_MV,
            t_inversion_threshold_mv: classification::DEFAULT_T_INVERSION_THRESHOLD_MV,
            t_flat_threshold_mv: classification::DEFAULT_T_FLAT_THRESHOLD_MV,
        }
    }
}

impl DenoiseConfig {
    /// Validate decomposition depth and threshold parameters
    pub fn validate(&self) -> EcgResult<()> {
        const STAGE: PipelineStage = PipelineStage::Denoising;

        if !(denoise::MIN_LEVELS..=denoise::MAX_LEVELS).contains(&self.levels) {
            return Err(EcgError::configuration(
                STAGE,
                "levels",
                format!(
                    "must be within {}..={}, got {}",
                    denoise::MIN_LEVELS,
                    denoise::MAX_LEVELS,
                    self.levels
                ),
            ));
        }
        require_positive(STAGE, "threshold_scale", self.threshold_scale)?;

        if let ThresholdRule::Fixed { value } = self.threshold_rule {
            if !value.is_finite() || value < 0.0 {
                return Err(EcgError::configuration(
                    STAGE,
                    "threshold_rule.value",
                    format!("must be finite and >= 0, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

impl DetectionConfig {
    /// Validate window lengths and threshold fractions
    pub fn validate(&self) -> EcgResult<()> {
        const STAGE: PipelineStage = PipelineStage::Detection;

        require_positive(STAGE, "refractory_period_s", self.refractory_period_s)?;
        require_positive(STAGE, "rolling_window_s", self.rolling_window_s)?;
        require_positive(STAGE, "q_window_s", self.q_window_s)?;
        require_positive(STAGE, "s_window_s", self.s_window_s)?;
        require_positive(STAGE, "p_window_s", self.p_window_s)?;
        require_positive(STAGE, "expected_rr_s", self.expected_rr_s)?;

        if !self.min_st_gap_s.is_finite() || self.min_st_gap_s < 0.0 {
            return Err(EcgError::configuration(STAGE, "min_st_gap_s", "must be finite and >= 0"));
        }
        if !self.t_wave_rejection_window_s.is_finite() || self.t_wave_rejection_window_s < 0.0 {
            return Err(EcgError::configuration(
                STAGE,
                "t_wave_rejection_window_s",
                "must be finite and >= 0",
            ));
        }
        if !(0.0..1.0).contains(&self.t_wave_slope_ratio) {
            return Err(EcgError::configuration(
                STAGE,
                "t_wave_slope_ratio",
                format!("must be within [0, 1), got {}", self.t_wave_slope_ratio),
            ));
        }
        for (name, fraction) in [
            ("threshold_fraction", self.threshold_fraction),
            ("t_window_rr_fraction", self.t_window_rr_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(EcgError::configuration(
                    STAGE,
                    name,
                    format!("must be within (0, 1], got {}", fraction),
                ));
            }
        }
        if let Some(height) = self.min_peak_height {
            if !height.is_finite() {
                return Err(EcgError::configuration(STAGE, "min_peak_height", "must be finite"));
            }
        }
        Ok(())
    }
}

impl IntervalConfig {
    /// Validate measurement offsets
    pub fn validate(&self) -> EcgResult<()> {
        const STAGE: PipelineStage = PipelineStage::Intervals;

        require_positive(STAGE, "st_point_offset_s", self.st_point_offset_s)?;
        require_positive(STAGE, "st_averaging_window_s", self.st_averaging_window_s)?;
        require_positive(STAGE, "p_onset_offset_s", self.p_onset_offset_s)?;
        require_positive(STAGE, "baseline_window_s", self.baseline_window_s)?;
        require_positive(STAGE, "fallback_baseline_start_s", self.fallback_baseline_start_s)?;

        if !self.fallback_baseline_end_s.is_finite()
            || self.fallback_baseline_end_s < 0.0
            || self.fallback_baseline_end_s >= self.fallback_baseline_start_s
        {
            return Err(EcgError::configuration(
                STAGE,
                "fallback_baseline_end_s",
                "must be >= 0 and smaller than fallback_baseline_start_s",
            ));
        }
        Ok(())
    }
}

impl ClassificationConfig {
    /// Validate reference ranges
    pub fn validate(&self) -> EcgResult<()> {
        const STAGE: PipelineStage = PipelineStage::Classification;

        require_positive(STAGE, "bradycardia_below_bpm", self.bradycardia_below_bpm)?;
        require_positive(STAGE, "tachycardia_above_bpm", self.tachycardia_above_bpm)?;
        require_positive(STAGE, "rhythm_cv_threshold", self.rhythm_cv_threshold)?;
        require_positive(STAGE, "pq_min_s", self.pq_min_s)?;
        require_positive(STAGE, "pq_max_s", self.pq_max_s)?;
        require_positive(STAGE, "st_deviation_threshold_mv", self.st_deviation_threshold_mv)?;
        require_positive(STAGE, "t_inversion_threshold_mv", self.t_inversion_threshold_mv)?;
        require_positive(STAGE, "t_flat_threshold_mv", self.t_flat_threshold_mv)?;

        if self.bradycardia_below_bpm > self.tachycardia_above_bpm {
            return Err(EcgError::configuration(
                STAGE,
                "bradycardia_below_bpm",
                "must not exceed tachycardia_above_bpm",
            ));
        }
        if self.pq_min_s > self.pq_max_s {
            return Err(EcgError::configuration(STAGE, "pq_min_s", "must not exceed pq_max_s"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_are_valid() {
        assert!(DenoiseConfig::default().validate().is_ok());
        assert!(DetectionConfig::default().validate().is_ok());
        assert!(IntervalConfig::default().validate().is_ok());
        assert!(ClassificationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_levels() {
        let mut config = DenoiseConfig::default();
        config.levels = 0;
        assert!(matches!(config.validate(), Err(EcgError::Configuration { .. })));

        config.levels = denoise::MAX_LEVELS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_fixed_threshold() {
        let config = DenoiseConfig {
            threshold_rule: ThresholdRule::Fixed { value: -0.5 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_detection_fraction() {
        let mut config = DetectionConfig::default();
        config.threshold_fraction = 1.5;
        assert!(config.validate().is_err());

        config.threshold_fraction = 0.5;
        config.refractory_period_s = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_reference_ranges() {
        let mut config = ClassificationConfig::default();
        config.pq_min_s = 0.3;
        assert!(config.validate().is_err());

        let mut config = ClassificationConfig::default();
        config.bradycardia_below_bpm = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fallback_window_ordering() {
        let mut config = IntervalConfig::default();
        config.fallback_baseline_end_s = 0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = DenoiseConfig {
            wavelet: WaveletFamily::Sym4,
            threshold_rule: ThresholdRule::Fixed { value: 0.05 },
            shrinkage: ShrinkageMode::Hard,
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: DenoiseConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: DetectionConfig = toml::from_str("refractory_period_s = 0.25").unwrap();
        assert_eq!(config.refractory_period_s, 0.25);
        assert_eq!(config.threshold_fraction, detection::DEFAULT_THRESHOLD_FRACTION);
        assert_eq!(config.min_peak_height, None);
    }
}
