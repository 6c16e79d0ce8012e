//! Denoising quality estimates
//!
//! Ratios comparing a record before and after denoising. They are reported
//! alongside the metric report and never gate the pipeline.

use std::f64::consts::PI;

use rustfft::{num_complex::Complex64, FftPlanner};
use serde::Serialize;

use crate::config::constants::quality::{DEFAULT_WELCH_SEGMENT_LEN, PSD_EDGE_TRIM_SAMPLES};
use crate::utils::stats;

/// Quality figures for one denoised record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityEstimate {
    /// Mean over standard deviation of the denoised record
    pub mean_to_std_ratio: f64,
    /// Signal energy over residual energy, in dB
    pub residual_snr_db: Option<f64>,
    /// Same ratio restricted to R-peak samples in the numerator
    pub peak_snr_db: Option<f64>,
    /// Welch PSD power of the input over that of the residual, in dB
    pub psd_snr_db: Option<f64>,
}

impl QualityEstimate {
    /// Compute every estimate for `original` against `denoised`
    pub fn assess(original: &[f64], denoised: &[f64], r_peaks: &[usize], sampling_rate_hz: f64) -> Self {
        Self {
            mean_to_std_ratio: mean_to_std_ratio(denoised),
            residual_snr_db: residual_snr_db(original, denoised, None),
            peak_snr_db: if r_peaks.is_empty() {
                None
            } else {
                residual_snr_db(original, denoised, Some(r_peaks))
            },
            psd_snr_db: psd_snr_db(original, denoised, sampling_rate_hz),
        }
    }
}

/// Mean over population standard deviation; 0 when the deviation is 0
pub fn mean_to_std_ratio(samples: &[f64]) -> f64 {
    match (stats::mean(samples), stats::std_dev(samples)) {
        (Some(m), Some(sd)) if sd > 0.0 => m / sd,
        _ => 0.0,
    }
}

/// `10 log10(signal energy / residual energy)`
///
/// With `peaks`, only those samples of `original` contribute to the signal
/// energy. `None` when the lengths differ or the residual is zero.
pub fn residual_snr_db(original: &[f64], denoised: &[f64], peaks: Option<&[usize]>) -> Option<f64> {
    if original.len() != denoised.len() || original.is_empty() {
        return None;
    }
    let residual: f64 = original
        .iter()
        .zip(denoised)
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    if residual <= 0.0 {
        return None;
    }

    let signal = match peaks {
        Some(peaks) => peaks
            .iter()
            .filter_map(|&i| original.get(i))
            .map(|x| x * x)
            .sum(),
        None => stats::energy(original),
    };
    (signal > 0.0).then(|| 10.0 * (signal / residual).log10())
}

/// Welch power spectral density estimate
///
/// Hann-windowed segments with 50 % overlap, density-scaled one-sided
/// spectrum. Returns `(frequencies_hz, power)`; empty for empty input.
pub fn welch_psd(samples: &[f64], sampling_rate_hz: f64, segment_len: usize) -> (Vec<f64>, Vec<f64>) {
    let segment_len = segment_len.min(samples.len());
    if segment_len == 0 {
        return (Vec::new(), Vec::new());
    }
    let hop = (segment_len / 2).max(1);

    let window: Vec<f64> = if segment_len == 1 {
        vec![1.0]
    } else {
        (0..segment_len)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / segment_len as f64).cos())
            .collect()
    };
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (sampling_rate_hz * window_power);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(segment_len);
    let bins = segment_len / 2 + 1;
    let mut power = vec![0.0; bins];
    let mut buffer = vec![Complex64::new(0.0, 0.0); segment_len];
    let mut segments = 0usize;

    let mut start = 0;
    while start + segment_len <= samples.len() {
        let segment = &samples[start..start + segment_len];
        let mean = stats::mean(segment).unwrap_or(0.0);
        for ((slot, &x), &w) in buffer.iter_mut().zip(segment).zip(&window) {
            *slot = Complex64::new((x - mean) * w, 0.0);
        }
        fft.process(&mut buffer);

        for (k, p) in power.iter_mut().enumerate() {
            let mut value = buffer[k].norm_sqr() * scale;
            let is_edge = k == 0 || (segment_len % 2 == 0 && k == bins - 1);
            if !is_edge {
                value *= 2.0;
            }
            *p += value;
        }
        segments += 1;
        start += hop;
    }

    power.iter_mut().for_each(|p| *p /= segments as f64);
    let frequencies = (0..bins)
        .map(|k| k as f64 * sampling_rate_hz / segment_len as f64)
        .collect();
    (frequencies, power)
}

/// `10 log10` of the input PSD power over the residual PSD power
///
/// The residual drops [`PSD_EDGE_TRIM_SAMPLES`] at each end, where the
/// periodic extension of the transform distorts the reconstruction.
pub fn psd_snr_db(original: &[f64], denoised: &[f64], sampling_rate_hz: f64) -> Option<f64> {
    let trim = PSD_EDGE_TRIM_SAMPLES;
    if original.len() != denoised.len() || original.len() <= 2 * trim {
        return None;
    }
    let residual: Vec<f64> = original[trim..original.len() - trim]
        .iter()
        .zip(&denoised[trim..denoised.len() - trim])
        .map(|(a, b)| a - b)
        .collect();

    let (_, signal_psd) = welch_psd(original, sampling_rate_hz, DEFAULT_WELCH_SEGMENT_LEN);
    let (_, noise_psd) = welch_psd(&residual, sampling_rate_hz, DEFAULT_WELCH_SEGMENT_LEN);
    let signal_power: f64 = signal_psd.iter().sum();
    let noise_power: f64 = noise_psd.iter().sum();

    (signal_power > 0.0 && noise_power > 0.0).then(|| 10.0 * (signal_power / noise_power).log10())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, fs: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_mean_to_std_ratio() {
        assert_eq!(mean_to_std_ratio(&[2.0; 10]), 0.0);
        assert!((mean_to_std_ratio(&[1.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_residual_snr() {
        let original = [1.0, -1.0, 1.0, -1.0];
        let denoised = [0.9, -0.9, 0.9, -0.9];
        // energy 4, residual 0.04 -> 20 dB
        let snr = residual_snr_db(&original, &denoised, None).unwrap();
        assert!((snr - 20.0).abs() < 1e-9);

        let at_peaks = residual_snr_db(&original, &denoised, Some(&[0])).unwrap();
        assert!((at_peaks - 10.0 * (1.0f64 / 0.04).log10()).abs() < 1e-9);

        assert_eq!(residual_snr_db(&original, &original, None), None);
        assert_eq!(residual_snr_db(&original, &denoised[..2], None), None);
    }

    #[test]
    fn test_welch_peak_at_tone_frequency() {
        let fs = 250.0;
        let (freqs, psd) = welch_psd(&sine(25.0, fs, 2048), fs, 256);
        assert_eq!(freqs.len(), 129);

        let peak = psd
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| freqs[k])
            .unwrap();
        assert!((peak - 25.0).abs() < fs / 256.0);
    }

    #[test]
    fn test_welch_preserves_power() {
        // a unit sine has variance 0.5
        let fs = 250.0;
        let (freqs, psd) = welch_psd(&sine(31.25, fs, 4096), fs, 256);
        let df = freqs[1] - freqs[0];
        let total: f64 = psd.iter().sum::<f64>() * df;
        assert!((total - 0.5).abs() < 0.05, "total power {}", total);
    }

    #[test]
    fn test_psd_snr_improves_with_smaller_residual() {
        let fs = 250.0;
        let clean = sine(5.0, fs, 1024);
        let noise = sine(60.0, fs, 1024);
        let small: Vec<f64> = clean.iter().zip(&noise).map(|(c, n)| c + 0.01 * n).collect();
        let large: Vec<f64> = clean.iter().zip(&noise).map(|(c, n)| c + 0.3 * n).collect();

        let good = psd_snr_db(&small, &clean, fs).unwrap();
        let poor = psd_snr_db(&large, &clean, fs).unwrap();
        assert!(good > poor);
        assert!(psd_snr_db(&clean, &clean, fs).is_none());
    }

    #[test]
    fn test_assess() {
        let original = [1.0, -1.0, 1.0, -1.0];
        let denoised = [0.9, -0.9, 0.9, -0.9];
        let estimate = QualityEstimate::assess(&original, &denoised, &[], 250.0);
        assert!(estimate.residual_snr_db.is_some());
        assert_eq!(estimate.peak_snr_db, None);
        assert_eq!(estimate.psd_snr_db, None);
    }
}
