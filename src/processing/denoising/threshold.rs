//! Noise estimation and coefficient shrinkage

use crate::config::constants::denoise::MAD_TO_SIGMA;
use crate::config::{ShrinkageMode, ThresholdRule};
use crate::utils::stats::median_absolute;

/// Robust noise sigma from the finest detail level: `median(|d|) / 0.6745`
pub fn estimate_noise_sigma(finest_detail: &[f64]) -> f64 {
    median_absolute(finest_detail).map_or(0.0, |mad| mad / MAD_TO_SIGMA)
}

/// Threshold for `len` coefficients under `rule`, scaled by `scale`
pub fn select_threshold(rule: ThresholdRule, noise_sigma: f64, len: usize, scale: f64) -> f64 {
    let base = match rule {
        ThresholdRule::Universal => {
            if len < 2 {
                0.0
            } else {
                noise_sigma * (2.0 * (len as f64).ln()).sqrt()
            }
        }
        ThresholdRule::Fixed { value } => value,
    };
    base * scale
}

/// Shrink one coefficient
#[inline]
pub fn shrink(value: f64, threshold: f64, mode: ShrinkageMode) -> f64 {
    let magnitude = value.abs();
    if magnitude <= threshold {
        return 0.0;
    }
    match mode {
        ShrinkageMode::Hard => value,
        ShrinkageMode::Soft => value.signum() * (magnitude - threshold),
    }
}

/// Shrink every coefficient in place
pub fn shrink_all(coefficients: &mut [f64], threshold: f64, mode: ShrinkageMode) {
    if threshold <= 0.0 {
        return;
    }
    coefficients
        .iter_mut()
        .for_each(|c| *c = shrink(*c, threshold, mode));
}
