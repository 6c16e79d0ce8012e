// src/signal.rs
//! Signal containers handed between pipeline stages

use serde::Serialize;

use crate::error::{require_positive, EcgError, EcgResult, PipelineStage};

/// A single-lead ECG record: samples in millivolts plus the sampling rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    samples: Vec<f64>,
    sampling_rate_hz: f64,
}

impl Signal {
    /// Create a signal, validating the sampling rate and every sample
    pub fn new(samples: Vec<f64>, sampling_rate_hz: f64) -> EcgResult<Self> {
        require_positive(PipelineStage::Ingestion, "sampling_rate_hz", sampling_rate_hz)?;

        if samples.is_empty() {
            return Err(EcgError::InsufficientLength { required: 1, actual: 0 });
        }
        if let Some((index, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(EcgError::InvalidSample { index, value });
        }

        Ok(Self { samples, sampling_rate_hz })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record duration in seconds
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate_hz
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Output of the wavelet denoiser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenoisedSignal {
    samples: Vec<f64>,
    sampling_rate_hz: f64,
    noise_sigma: f64,
    threshold: f64,
}

impl DenoisedSignal {
    pub(crate) fn new(samples: Vec<f64>, sampling_rate_hz: f64, noise_sigma: f64, threshold: f64) -> Self {
        Self {
            samples,
            sampling_rate_hz,
            noise_sigma,
            threshold,
        }
    }

    /// Wrap samples that are already clean, bypassing the denoiser
    pub fn from_clean(signal: Signal) -> Self {
        let sampling_rate_hz = signal.sampling_rate_hz();
        Self::new(signal.into_samples(), sampling_rate_hz, 0.0, 0.0)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate_hz
    }

    /// Noise standard deviation estimated from the finest detail level
    pub fn noise_sigma(&self) -> f64 {
        self.noise_sigma
    }

    /// Threshold applied to the detail coefficients
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Convert a duration in seconds to a whole number of samples
    pub fn seconds_to_samples(&self, seconds: f64) -> usize {
        seconds_to_samples(seconds, self.sampling_rate_hz)
    }

    /// Re-enter the pipeline as a raw signal
    pub fn into_signal(self) -> Signal {
        Signal {
            samples: self.samples,
            sampling_rate_hz: self.sampling_rate_hz,
        }
    }
}

/// Rounds `seconds * rate` to the nearest sample count
pub(crate) fn seconds_to_samples(seconds: f64, sampling_rate_hz: f64) -> usize {
    (seconds * sampling_rate_hz).round().max(0.0) as usize
}
